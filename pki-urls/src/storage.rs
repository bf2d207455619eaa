//! Key-value storage abstraction the configuration store persists through

use crate::error::StorageError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// A single value held under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Serialize `value` as JSON under `key`.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> serde_json::Result<Self> {
        Ok(Self::new(key, serde_json::to_vec(value)?))
    }

    pub fn decode_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.value)
    }
}

/// Get/put storage with single-key all-or-nothing writes.
///
/// Backends that can atomically compare and replace a value opt in through
/// [`Storage::supports_compare_and_swap`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend_name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError>;

    /// Replaces the value under `entry.key` as a single all-or-nothing write.
    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError>;

    fn supports_compare_and_swap(&self) -> bool {
        false
    }

    /// Write `entry` only if the current value equals `expected`.
    ///
    /// `expected == None` requires the key to be absent. Returns `false` when
    /// the current value did not match and nothing was written.
    async fn compare_and_swap(
        &self,
        expected: Option<Vec<u8>>,
        entry: StorageEntry,
    ) -> Result<bool, StorageError> {
        let _ = (expected, entry);
        Err(StorageError::Unsupported(self.backend_name()))
    }
}

/// In-memory storage for development and testing
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        Ok(self
            .entries
            .get(key)
            .map(|value| StorageEntry::new(key, value.value().clone())))
    }

    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        self.entries.insert(entry.key, entry.value);
        Ok(())
    }

    fn supports_compare_and_swap(&self) -> bool {
        true
    }

    async fn compare_and_swap(
        &self,
        expected: Option<Vec<u8>>,
        entry: StorageEntry,
    ) -> Result<bool, StorageError> {
        // The entry guard holds the shard lock, so check and write are atomic.
        match self.entries.entry(entry.key) {
            Entry::Occupied(mut occupied) => {
                if expected.as_deref() == Some(occupied.get().as_slice()) {
                    occupied.insert(entry.value);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                if expected.is_none() {
                    vacant.insert(entry.value);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
        }
    }
}
