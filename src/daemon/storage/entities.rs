use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::daemon::accounting::hostname::{matches_tracked, normalize_site_input, MatchMode};

/// Time spent on tracked sites during one local day. Totals only change through
/// [DayRecord::credit], so the day total is always the sum of the per-site values.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DayRecordEntity", into = "DayRecordEntity")]
pub struct DayRecord {
    date: NaiveDate,
    total_seconds: u64,
    sites: BTreeMap<String, u64>,
    last_notified_hour: u32,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_seconds: 0,
            sites: BTreeMap::new(),
            last_notified_hour: 0,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_seconds / 60
    }

    pub fn total_hours(&self) -> u32 {
        (self.total_seconds / 3600) as u32
    }

    pub fn sites(&self) -> &BTreeMap<String, u64> {
        &self.sites
    }

    pub fn site_seconds(&self, hostname: &str) -> u64 {
        self.sites.get(hostname).copied().unwrap_or(0)
    }

    pub fn last_notified_hour(&self) -> u32 {
        self.last_notified_hour
    }

    pub fn credit(&mut self, hostname: &str, seconds: u64) {
        *self.sites.entry(hostname.to_string()).or_insert(0) += seconds;
        self.total_seconds += seconds;
    }

    /// Moves the notification watermark up to the current hour count and returns every hour
    /// boundary crossed since the last call. The watermark never goes down.
    pub fn advance_hour_watermark(&mut self) -> Vec<u32> {
        let hours = self.total_hours();
        if hours <= self.last_notified_hour {
            return vec![];
        }
        let crossed = (self.last_notified_hour + 1..=hours).collect();
        self.last_notified_hour = hours;
        crossed
    }
}

/// On-disk shape of [DayRecord]. Older versions stored minutes only, in which case both the total
/// and the per-site values are minutes. The total is always rebuilt from the sites, a stored total
/// that disagrees with them is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayRecordEntity {
    date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_seconds: Option<u64>,
    #[serde(default)]
    total_minutes: u64,
    #[serde(default)]
    sites: BTreeMap<String, u64>,
    #[serde(default)]
    last_notification_hour: u32,
}

impl From<DayRecordEntity> for DayRecord {
    fn from(entity: DayRecordEntity) -> Self {
        let sites: BTreeMap<String, u64> = match entity.total_seconds {
            Some(_) => entity.sites,
            None => {
                warn!("Migrating minute based record for {}", entity.date);
                entity
                    .sites
                    .into_iter()
                    .map(|(site, minutes)| (site, minutes * 60))
                    .collect()
            }
        };
        let total_seconds = sites.values().sum();
        let stored_total = entity.total_seconds.unwrap_or(entity.total_minutes * 60);
        if stored_total != total_seconds {
            warn!(
                "Record for {} had total {stored_total}s while sites sum up to {total_seconds}s",
                entity.date
            );
        }
        DayRecord {
            date: entity.date,
            total_seconds,
            sites,
            last_notified_hour: entity.last_notification_hour,
        }
    }
}

impl From<DayRecord> for DayRecordEntity {
    fn from(record: DayRecord) -> Self {
        DayRecordEntity {
            date: record.date,
            total_seconds: Some(record.total_seconds),
            total_minutes: record.total_minutes(),
            sites: record.sites,
            last_notification_hour: record.last_notified_hour,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub total_minutes: u64,
}

/// Archived day totals, newest first, at most one entry per date.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<HistoryEntry>);

impl History {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Archives a finished day. A day that is already present is added to, so that archiving the
    /// same stale day from two racing writers never produces a duplicate entry. Only the `limit`
    /// newest entries are kept.
    pub fn archive(&mut self, day: &DayRecord, limit: usize) {
        if day.total_seconds() > 0 {
            match self.0.iter_mut().find(|entry| entry.date == day.date()) {
                Some(entry) => entry.total_minutes += day.total_minutes(),
                None => self.0.insert(
                    0,
                    HistoryEntry {
                        date: day.date(),
                        total_minutes: day.total_minutes(),
                    },
                ),
            }
        }
        self.0.truncate(limit);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddSiteOutcome {
    Added,
    AlreadyTracked,
    Invalid,
}

/// Hostnames the user opted into measuring, in the order they were added.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedSites(Vec<String>);

impl TrackedSites {
    pub fn new(sites: Vec<String>) -> Self {
        Self(sites)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn add(&mut self, input: &str) -> AddSiteOutcome {
        let Some(site) = normalize_site_input(input) else {
            return AddSiteOutcome::Invalid;
        };
        if self.0.contains(&site) {
            return AddSiteOutcome::AlreadyTracked;
        }
        self.0.push(site);
        AddSiteOutcome::Added
    }

    pub fn remove(&mut self, input: &str) -> bool {
        let Some(site) = normalize_site_input(input) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|v| *v != site);
        before != self.0.len()
    }

    /// Returns the first tracked entry `hostname` belongs to.
    pub fn find_match(&self, hostname: &str, mode: MatchMode) -> Option<&str> {
        self.iter()
            .find(|tracked| matches_tracked(hostname, tracked, mode))
    }
}
