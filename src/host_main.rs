use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sitetally::{
    daemon::{args::HostArgs, start_host},
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, HOST_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::error;

fn main() -> Result<()> {
    let args = HostArgs::parse();
    run(args).inspect_err(|e| error!("Native host failed {e:?}"))
}

fn run(args: HostArgs) -> Result<()> {
    let app_dir = resolve_application_path(args.dir.clone())?;
    enable_logging(HOST_PREFIX, &app_dir, args.log, args.log_console)?;
    let config = args.accountant_config();

    let runtime = single_thread_runtime()?;
    runtime.block_on(start_host(app_dir, config))?;
    // Stdin is read on a blocking thread that can't be interrupted.
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}
