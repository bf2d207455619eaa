//! Configuration for the URL configuration service

use crate::backends::FileSystemStorage;
use crate::error::Result;
use crate::handler::UrlConfigHandler;
use crate::storage::{InMemoryStorage, Storage};
use crate::store::ConfigStore;
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Prefix for environment overrides, e.g. `PKI_URLS__STORAGE__TYPE=memory`.
pub const ENV_PREFIX: &str = "PKI_URLS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Where the URL record is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    Memory,
    Filesystem(FileSystemConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Filesystem(FileSystemConfig {
            path: PathBuf::from("./pki-data"),
        })
    }
}

impl ServiceConfig {
    /// Layers an optional config file (format from its extension) under
    /// `PKI_URLS__*` environment variables. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub async fn build_storage(&self) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            StorageConfig::Memory => {
                info!("Using in-memory storage; URL configuration will not persist");
                Ok(Arc::new(InMemoryStorage::new()))
            }
            StorageConfig::Filesystem(fs_config) => {
                info!(path = %fs_config.path.display(), "Using filesystem storage");
                let storage = FileSystemStorage::new(&fs_config.path);
                storage.initialize().await?;
                Ok(Arc::new(storage))
            }
        }
    }

    pub async fn build_handler(&self) -> Result<UrlConfigHandler> {
        let storage = self.build_storage().await?;
        Ok(UrlConfigHandler::new(ConfigStore::new(storage)))
    }
}
