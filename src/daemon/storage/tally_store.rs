use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use super::{
    entities::{DayRecord, History, TrackedSites},
    kv_store::KeyValueStore,
};

pub const TRACKED_SITES_KEY: &str = "trackedSites";
/// Name used for the tracked sites before they were renamed.
pub const LEGACY_TRACKED_SITES_KEY: &str = "trackedWebsites";
pub const TODAY_KEY: &str = "today";
pub const HISTORY_KEY: &str = "history";

/// Typed access to the three records sitetally persists.
pub struct TallyStore<S> {
    store: S,
}

impl<S: KeyValueStore> TallyStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates every record that doesn't exist yet. Existing records are left untouched.
    pub async fn initialize(&self, today: NaiveDate) -> Result<()> {
        if self.store.get::<TrackedSites>(TRACKED_SITES_KEY).await?.is_none() {
            let sites = self.tracked_sites().await?;
            info!("Initializing tracked sites with {} entries", sites.iter().count());
            self.save_tracked_sites(&sites).await?;
        }
        if self.store.get::<DayRecord>(TODAY_KEY).await?.is_none() {
            info!("Initializing day record for {today}");
            self.save_today(&DayRecord::new(today)).await?;
        }
        if self.store.get::<History>(HISTORY_KEY).await?.is_none() {
            self.save_history(&History::default()).await?;
        }
        Ok(())
    }

    pub async fn tracked_sites(&self) -> Result<TrackedSites> {
        if let Some(sites) = self.store.get(TRACKED_SITES_KEY).await? {
            return Ok(sites);
        }
        Ok(self
            .store
            .get(LEGACY_TRACKED_SITES_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_tracked_sites(&self, sites: &TrackedSites) -> Result<()> {
        self.store.set(TRACKED_SITES_KEY, sites).await
    }

    /// Reads the persisted day record. Without one a fresh record for `fallback_date` is returned.
    pub async fn today(&self, fallback_date: NaiveDate) -> Result<DayRecord> {
        Ok(self
            .store
            .get(TODAY_KEY)
            .await?
            .unwrap_or_else(|| DayRecord::new(fallback_date)))
    }

    pub async fn save_today(&self, record: &DayRecord) -> Result<()> {
        self.store.set(TODAY_KEY, record).await
    }

    pub async fn history(&self) -> Result<History> {
        Ok(self.store.get(HISTORY_KEY).await?.unwrap_or_default())
    }

    pub async fn save_history(&self, history: &History) -> Result<()> {
        self.store.set(HISTORY_KEY, history).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::{TallyStore, LEGACY_TRACKED_SITES_KEY, TRACKED_SITES_KEY};
    use crate::daemon::storage::{
        entities::{DayRecord, TrackedSites},
        kv_store::{JsonFileStore, KeyValueStore},
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    #[tokio::test]
    async fn test_initialize_creates_missing_records() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        store.initialize(TEST_DATE).await?;

        assert!(dir.path().join("trackedSites.json").exists());
        assert!(dir.path().join("history.json").exists());
        assert_eq!(store.today(TEST_DATE.succ_opt().unwrap()).await?, DayRecord::new(TEST_DATE));
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_records() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStore::new(JsonFileStore::new(dir.path().to_owned())?);
        let mut record = DayRecord::new(TEST_DATE);
        record.credit("a.com", 42);
        store.save_today(&record).await?;

        store.initialize(TEST_DATE.succ_opt().unwrap()).await?;

        assert_eq!(store.today(TEST_DATE).await?, record);
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_tracked_sites_are_migrated() -> Result<()> {
        let dir = tempdir()?;
        let raw = JsonFileStore::new(dir.path().to_owned())?;
        raw.set(LEGACY_TRACKED_SITES_KEY, &vec!["youtube.com"]).await?;

        let store = TallyStore::new(&raw);
        store.initialize(TEST_DATE).await?;

        let migrated: Option<TrackedSites> = raw.get(TRACKED_SITES_KEY).await?;
        assert_eq!(migrated, Some(TrackedSites::new(vec!["youtube.com".into()])));
        Ok(())
    }
}
