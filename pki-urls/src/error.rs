//! Error types for the URL configuration service

use crate::models::UrlField;
use thiserror::Error;

/// Failures surfaced by a [`Storage`](crate::storage::Storage) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation not supported by {0} storage")]
    Unsupported(&'static str),
}

#[derive(Error, Debug)]
pub enum UrlConfigError {
    /// A list element failed URL parsing; nothing was persisted.
    #[error("invalid URL found in {field}; url is {url}, error is {source}")]
    Validation {
        field: UrlField,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("URL configuration was modified concurrently; reload and retry")]
    ConcurrentModification,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported path: {0}")]
    UnsupportedPath(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

impl UrlConfigError {
    /// Errors caused by the caller's input rather than by the service or its storage.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            UrlConfigError::Validation { .. } | UrlConfigError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, UrlConfigError>;
