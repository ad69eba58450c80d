use std::io::IsTerminal;

use ansi_term::Colour;
use anyhow::Result;
use chrono::Local;

use crate::{
    daemon::{
        accounting::{badge::format_badge_text, rollover::current_day},
        config::HISTORY_LIMIT,
        storage::{
            entities::{DayRecord, HistoryEntry},
            kv_store::KeyValueStore,
            tally_store::TallyStore,
        },
    },
    utils::{
        percentage::{share_percentage, Percentage},
        time::short_date,
    },
};

const BAR_WIDTH: u64 = 40;

#[derive(Debug, PartialEq)]
pub struct SiteShare {
    pub hostname: String,
    pub seconds: u64,
    pub share: Percentage,
}

/// Prints the total for today followed by every hostname that reached `min_share` of it.
pub async fn print_today<S: KeyValueStore>(
    store: &TallyStore<S>,
    min_share: Percentage,
) -> Result<()> {
    let day = current_day(store, Local::now().date_naive(), HISTORY_LIMIT).await?;
    println!("Today\t{}", format_duration(day.total_seconds()));
    for entry in site_shares(&day, min_share) {
        println!(
            "{}%\t{}\t{}",
            *entry.share as u32,
            format_duration(entry.seconds),
            entry.hostname
        );
    }
    Ok(())
}

/// Prints a bar per archived day, newest first.
pub async fn print_history<S: KeyValueStore>(store: &TallyStore<S>, days: usize) -> Result<()> {
    // Loading today first archives a stale record, yesterday included.
    current_day(store, Local::now().date_naive(), HISTORY_LIMIT).await?;
    let history = store.history().await?;
    if history.is_empty() {
        println!("No history yet");
        return Ok(());
    }
    let colored = std::io::stdout().is_terminal();
    for line in history_lines(history.entries(), days, colored) {
        println!("{line}");
    }
    Ok(())
}

/// Hostnames of `day` sorted by time spent, largest first.
pub fn site_shares(day: &DayRecord, min_share: Percentage) -> Vec<SiteShare> {
    let mut shares = day
        .sites()
        .iter()
        .map(|(hostname, &seconds)| SiteShare {
            hostname: hostname.clone(),
            seconds,
            share: share_percentage(seconds, day.total_seconds()),
        })
        .filter(|v| v.seconds > 0 && *v.share >= *min_share)
        .collect::<Vec<_>>();
    shares.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    shares
}

pub fn history_lines(entries: &[HistoryEntry], days: usize, colored: bool) -> Vec<String> {
    let shown = &entries[..days.min(entries.len())];
    let longest = shown.iter().map(|v| v.total_minutes).max().unwrap_or(0);
    shown
        .iter()
        .map(|entry| {
            let width = if longest == 0 {
                0
            } else {
                (entry.total_minutes * BAR_WIDTH).div_ceil(longest)
            };
            let bar = "█".repeat(width as usize);
            let bar = if colored {
                Colour::Blue.paint(bar).to_string()
            } else {
                bar
            };
            format!(
                "{:>5} {} {}",
                short_date(entry.date),
                bar,
                format_badge_text(entry.total_minutes)
            )
        })
        .collect()
}

/// Durations as `{m}m` below an hour and `{h}h {m}m` from an hour up.
pub fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}
