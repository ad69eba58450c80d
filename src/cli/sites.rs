use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use tracing::info;

use crate::daemon::{
    accounting::{
        hostname::{matches_tracked, MatchMode},
        rollover::current_day,
    },
    config::HISTORY_LIMIT,
    storage::{
        entities::{AddSiteOutcome, DayRecord, TrackedSites},
        kv_store::KeyValueStore,
        tally_store::TallyStore,
    },
};

use super::report::format_duration;

#[derive(Subcommand, Debug)]
pub enum SitesCommand {
    #[command(about = "Start tracking a site, e.g. `youtube.com` or `https://www.youtube.com/feed`")]
    Add { site: String },
    #[command(about = "Stop tracking a site")]
    Remove { site: String },
    #[command(about = "List tracked sites with time spent on them today")]
    List,
}

pub async fn process_sites_command<S: KeyValueStore>(
    store: &TallyStore<S>,
    command: SitesCommand,
) -> Result<()> {
    match command {
        SitesCommand::Add { site } => {
            let outcome = add_site(store, &site).await?;
            match outcome {
                AddSiteOutcome::Added => println!("Tracking {}", site.trim()),
                AddSiteOutcome::AlreadyTracked => println!("{} is already tracked", site.trim()),
                AddSiteOutcome::Invalid => println!("Please enter a website"),
            }
        }
        SitesCommand::Remove { site } => {
            if remove_site(store, &site).await? {
                println!("Stopped tracking {}", site.trim());
            } else {
                println!("{} isn't tracked", site.trim());
            }
        }
        SitesCommand::List => {
            let sites = store.tracked_sites().await?;
            if sites.is_empty() {
                println!("No sites are tracked");
                return Ok(());
            }
            let day = current_day(store, Local::now().date_naive(), HISTORY_LIMIT).await?;
            for (site, seconds) in site_times(&sites, &day) {
                let time = if seconds == 0 {
                    "No time today".to_string()
                } else {
                    format_duration(seconds)
                };
                println!("{site}\t{time}");
            }
        }
    }
    Ok(())
}

/// Adds a site to the tracked list. Nothing is written unless the list changed.
pub async fn add_site<S: KeyValueStore>(store: &TallyStore<S>, input: &str) -> Result<AddSiteOutcome> {
    let mut sites = store.tracked_sites().await?;
    let outcome = sites.add(input);
    if outcome == AddSiteOutcome::Added {
        store.save_tracked_sites(&sites).await?;
        info!("Added {input} to tracked sites");
    }
    Ok(outcome)
}

pub async fn remove_site<S: KeyValueStore>(store: &TallyStore<S>, input: &str) -> Result<bool> {
    let mut sites = store.tracked_sites().await?;
    let removed = sites.remove(input);
    if removed {
        store.save_tracked_sites(&sites).await?;
        info!("Removed {input} from tracked sites");
    }
    Ok(removed)
}

/// Time spent today on each tracked site, its subdomains included, in the order sites were added.
pub fn site_times(sites: &TrackedSites, day: &DayRecord) -> Vec<(String, u64)> {
    sites
        .iter()
        .map(|site| {
            let seconds = day
                .sites()
                .iter()
                .filter(|(hostname, _)| matches_tracked(hostname, site, MatchMode::Strict))
                .map(|(_, seconds)| seconds)
                .sum();
            (site.to_string(), seconds)
        })
        .collect()
}
