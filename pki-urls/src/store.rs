//! Persistence of the single URL record

use crate::error::{Result, UrlConfigError};
use crate::models::UrlConfig;
use crate::storage::{Storage, StorageEntry};
use std::sync::Arc;
use tracing::debug;

/// Storage key the record lives under.
pub const URLS_STORAGE_KEY: &str = "urls";

/// A loaded record together with the exact bytes it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUrlConfig {
    pub config: UrlConfig,
    pub raw: Vec<u8>,
}

/// Loads and saves the URL record through a [`Storage`] handle.
#[derive(Clone)]
pub struct ConfigStore {
    storage: Arc<dyn Storage>,
}

impl ConfigStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn supports_compare_and_swap(&self) -> bool {
        self.storage.supports_compare_and_swap()
    }

    /// Returns `None` when the record has never been written.
    pub async fn load(&self) -> Result<Option<UrlConfig>> {
        Ok(self.load_entry().await?.map(|stored| stored.config))
    }

    pub async fn load_entry(&self) -> Result<Option<StoredUrlConfig>> {
        let Some(entry) = self.storage.get(URLS_STORAGE_KEY).await? else {
            debug!(backend = self.storage.backend_name(), "No URL configuration stored");
            return Ok(None);
        };

        let config = entry.decode_json::<UrlConfig>()?;
        debug!(
            backend = self.storage.backend_name(),
            bytes = entry.value.len(),
            "Loaded URL configuration"
        );
        Ok(Some(StoredUrlConfig {
            config,
            raw: entry.value,
        }))
    }

    pub async fn save(&self, config: &UrlConfig) -> Result<()> {
        let entry = StorageEntry::json(URLS_STORAGE_KEY, config)?;
        self.storage.put(entry).await?;
        debug!(backend = self.storage.backend_name(), "Saved URL configuration");
        Ok(())
    }

    /// Saves only if the stored bytes still equal `expected` (`None`: still absent).
    pub async fn save_if_unchanged(
        &self,
        config: &UrlConfig,
        expected: Option<Vec<u8>>,
    ) -> Result<()> {
        let entry = StorageEntry::json(URLS_STORAGE_KEY, config)?;
        if !self.storage.compare_and_swap(expected, entry).await? {
            return Err(UrlConfigError::ConcurrentModification);
        }
        debug!(
            backend = self.storage.backend_name(),
            "Saved URL configuration with compare-and-swap"
        );
        Ok(())
    }
}
