//! URL configuration for the PKI engine
//!
//! Manages the single stored record listing which URLs are embedded into
//! certificates at issuance time:
//! - Issuing certificate locations (where the issuing CA certificate can be fetched)
//! - CRL distribution points
//! - OCSP responder addresses
//!
//! Reads return the record verbatim; writes are partial updates that replace
//! only the lists named in the request, after every new URL has passed syntax
//! validation. The record is persisted as a JSON object under the `urls` key
//! of a pluggable [`Storage`] backend.
//!
//! # Example
//!
//! ```rust
//! use pki_urls::{ConfigStore, InMemoryStorage, UrlConfigHandler, UrlConfigUpdate, UrlField};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ConfigStore::new(Arc::new(InMemoryStorage::new()));
//!     let handler = UrlConfigHandler::new(store);
//!
//!     let update = UrlConfigUpdate::new()
//!         .with(UrlField::OcspServers, "http://ocsp.example.com,http://ocsp2.example.com");
//!     handler.write(&update).await?;
//!
//!     let response = handler.read().await?.expect("record was written");
//!     println!("{:?}", response.data);
//!
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod handler;
pub mod logical;
pub mod models;
pub mod storage;
pub mod store;
pub mod validation;

pub use backends::FileSystemStorage;
pub use crate::config::{FileSystemConfig, ServiceConfig, StorageConfig};
pub use error::{Result, StorageError, UrlConfigError};
pub use handler::UrlConfigHandler;
pub use logical::{Operation, PathDescriptor, Request, Response, URLS_PATH};
pub use models::{UrlConfig, UrlConfigUpdate, UrlField};
pub use storage::{InMemoryStorage, Storage, StorageEntry};
pub use store::{ConfigStore, StoredUrlConfig, URLS_STORAGE_KEY};
