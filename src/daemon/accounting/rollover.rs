use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::daemon::storage::{entities::DayRecord, kv_store::KeyValueStore, tally_store::TallyStore};

/// Loads the day record for `today`, rolling the persisted one over first when it belongs to
/// another day. Safe to call any number of times: once the record is rolled over the following
/// calls only read.
pub async fn current_day<S: KeyValueStore>(
    store: &TallyStore<S>,
    today: NaiveDate,
    history_limit: usize,
) -> Result<DayRecord> {
    let record = store.today(today).await?;
    rollover_if_needed(store, record, today, history_limit).await
}

/// Archives `record` into the history and replaces it with an empty record for `today` unless it
/// already belongs to `today`.
pub async fn rollover_if_needed<S: KeyValueStore>(
    store: &TallyStore<S>,
    record: DayRecord,
    today: NaiveDate,
    history_limit: usize,
) -> Result<DayRecord> {
    if record.date() == today {
        return Ok(record);
    }

    if record.total_seconds() > 0 {
        let mut history = store.history().await?;
        history.archive(&record, history_limit);
        store.save_history(&history).await?;
    }

    let fresh = DayRecord::new(today);
    store.save_today(&fresh).await?;
    info!(
        "Rolled {} over into {today}, archived {}s",
        record.date(),
        record.total_seconds()
    );
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::current_day;
    use crate::daemon::storage::{
        entities::{DayRecord, History, HistoryEntry},
        kv_store::JsonFileStore,
        tally_store::TallyStore,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[tokio::test]
    async fn test_rollover_archives_previous_day() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        let mut record = DayRecord::new(date(1));
        record.credit("a.com", 600);
        store.save_today(&record).await?;

        let today = current_day(&store, date(2), 30).await?;

        assert_eq!(today, DayRecord::new(date(2)));
        assert_eq!(store.today(date(3)).await?, DayRecord::new(date(2)));
        assert_eq!(
            store.history().await?.entries(),
            &[HistoryEntry {
                date: date(1),
                total_minutes: 10
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_rollover_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        let mut record = DayRecord::new(date(1));
        record.credit("a.com", 600);
        store.save_today(&record).await?;

        current_day(&store, date(2), 30).await?;
        let once = store.history().await?;
        current_day(&store, date(2), 30).await?;

        assert_eq!(store.history().await?, once);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_day_is_not_archived() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        store.save_today(&DayRecord::new(date(1))).await?;

        let today = current_day(&store, date(2), 30).await?;

        assert_eq!(today.date(), date(2));
        assert!(store.history().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_racing_stale_rollover_adds_up() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        // Another writer already archived part of the day.
        store
            .save_history(&History::new(vec![HistoryEntry {
                date: date(1),
                total_minutes: 4,
            }]))
            .await?;
        let mut record = DayRecord::new(date(1));
        record.credit("a.com", 120);
        store.save_today(&record).await?;

        current_day(&store, date(2), 30).await?;

        let history = store.history().await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].total_minutes, 6);
        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_capped() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        for day in 1..=31 {
            let mut record = DayRecord::new(date(day));
            record.credit("a.com", 60);
            store.save_today(&record).await?;
            current_day(&store, date(day) + chrono::Duration::days(1), 30).await?;
        }

        let history = store.history().await?;
        assert_eq!(history.len(), 30);
        assert_eq!(history.entries()[0].date, date(31));
        assert_eq!(history.entries()[29].date, date(2));
        Ok(())
    }
}
