use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

/// Interface for abstracting the persistent key-value store. There are no multi-key transactions,
/// every key is read and written on its own.
pub trait KeyValueStore {
    /// Reads a value. Missing keys produce [None].
    fn get<T: DeserializeOwned>(&self, key: &str) -> impl Future<Output = Result<Option<T>>>;

    /// Replaces the value stored under `key`.
    fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get<V: DeserializeOwned>(&self, key: &str) -> impl Future<Output = Result<Option<V>>> {
        self.deref().get(key)
    }

    fn set<V: Serialize + Sync>(&self, key: &str, value: &V) -> impl Future<Output = Result<()>> {
        self.deref().set(key, value)
    }
}

/// The main realization of [KeyValueStore]. Every key is a JSON file inside a directory. Reads
/// take a shared lock and writes an exclusive one, so the host and the CLI never observe a half
/// written value.
pub struct JsonFileStore {
    store_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(format!("{key}.json"))
    }

    async fn read_locked(path: &Path) -> Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result?;
        Ok(Some(content))
    }

    async fn write_locked(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(path)
            .await?;

        // Truncation happens only after the lock is held, otherwise a reader could see an empty
        // file in between.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(content).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
}

impl KeyValueStore for JsonFileStore {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        debug!("Reading {path:?}");
        let Some(content) = Self::read_locked(&path)
            .await
            .with_context(|| format!("Failed to read {path:?}"))?
        else {
            return Ok(None);
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<T>(&content) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                // A corrupted value is treated as missing so that the next write heals it instead
                // of failing every tick.
                warn!("Found illegal json in {path:?}: {e}");
                Ok(None)
            }
        }
    }

    async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let content = serde_json::to_vec(value)?;
        debug!("Writing {} bytes into {path:?}", content.len());
        Self::write_locked(&path, &content)
            .await
            .with_context(|| format!("Failed to write {path:?}"))?;
        Ok(())
    }
}
