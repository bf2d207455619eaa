use crate::error::StorageError;
use crate::storage::{Storage, StorageEntry};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const ENTRY_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// File system storage backend, one file per key
///
/// Each write goes to its own uniquely named temporary sibling file which is
/// then renamed over the target, so readers see either the old or the new
/// value and concurrent writers never share a temp file. Compare-and-swap is
/// not supported.
pub struct FileSystemStorage {
    /// Base directory for storage
    base_path: PathBuf,
}

impl FileSystemStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Create the base directory if it does not exist yet
    pub async fn initialize(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::Unavailable(format!(
                "Failed to create storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }

    /// Escapes `%` and `/` so distinct keys map to distinct file names.
    fn file_stem(key: &str) -> String {
        key.replace('%', "%25").replace('/', "%2F")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", Self::file_stem(key), ENTRY_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!(
            "{}.{}.{}",
            Self::file_stem(key),
            Uuid::new_v4().simple(),
            TEMP_EXTENSION
        ))
    }

    async fn write_temp(temp_path: &Path, value: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(value).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl Storage for FileSystemStorage {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        match fs::read(self.entry_path(key)).await {
            Ok(value) => Ok(Some(StorageEntry::new(key, value))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        self.initialize().await?;

        let temp_path = self.temp_path(&entry.key);
        let written = match Self::write_temp(&temp_path, &entry.value).await {
            Ok(()) => fs::rename(&temp_path, self.entry_path(&entry.key)).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(e.into());
        }

        debug!(key = %entry.key, bytes = entry.value.len(), "Wrote storage entry");
        Ok(())
    }
}
