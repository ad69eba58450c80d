pub mod report;
pub mod sites;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{print_history, print_today};
use sites::{process_sites_command, SitesCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{
        args::TuningArgs,
        start_host,
        storage::{kv_store::JsonFileStore, tally_store::TallyStore},
    },
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, CLI_PREFIX},
        percentage::Percentage,
    },
};

#[derive(Parser, Debug)]
#[command(name = "sitetally", version, long_about = None)]
#[command(about = "Time spent on the websites you chose to track", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Manage the list of tracked sites")]
    Sites {
        #[command(subcommand)]
        command: SitesCommand,
    },
    #[command(about = "Display time tracked today")]
    Today {
        #[arg(
            short = 'p',
            long = "min-share",
            help = "Only show sites with at least this share of the day",
            default_value_t = Percentage::new_opt(0.).unwrap()
        )]
        min_share: Percentage,
    },
    #[command(about = "Display daily totals of previous days")]
    History {
        #[arg(short, long, default_value_t = 30, help = "Number of days to show")]
        days: usize,
    },
    #[command(
        about = "Run the native messaging host in the current console. Messages are read from stdin"
    )]
    Serve {
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = resolve_application_path(args.dir)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let store = || -> Result<TallyStore<JsonFileStore>> {
        Ok(TallyStore::new(JsonFileStore::new(app_dir.join("storage"))?))
    };

    match args.commands {
        Commands::Sites { command } => process_sites_command(&store()?, command).await,
        Commands::Today { min_share } => print_today(&store()?, min_share).await,
        Commands::History { days } => print_history(&store()?, days).await,
        Commands::Serve { tuning } => start_host(app_dir.clone(), tuning.accountant_config()).await,
    }
}
