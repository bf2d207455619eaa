//! Read and partial-update operations over the URL record

use crate::error::{Result, UrlConfigError};
use crate::logical::{Operation, Request, Response, URLS_PATH};
use crate::models::{UrlConfig, UrlConfigUpdate, UrlField};
use crate::store::ConfigStore;
use crate::validation;
use logger_redacted::{redact_url, redact_urls};
use tracing::{debug, info, warn};

pub struct UrlConfigHandler {
    store: ConfigStore,
}

impl UrlConfigHandler {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Current record as a flat response, or `None` if nothing was ever written.
    pub async fn read(&self) -> Result<Option<Response>> {
        let config = self.store.load().await?;
        Ok(config.map(|config| Response::with_data(config.to_data())))
    }

    /// Applies the fields present in `update` and persists the merged record.
    ///
    /// Every supplied field is validated before anything is written; one bad
    /// URL rejects the whole write. On backends with compare-and-swap the save
    /// fails with [`UrlConfigError::ConcurrentModification`] if another writer
    /// saved in between. Other backends are last-writer-wins: two concurrent
    /// writes of different fields can lose one of the updates.
    pub async fn write(&self, update: &UrlConfigUpdate) -> Result<()> {
        let (mut config, expected) = match self.store.load_entry().await? {
            Some(stored) => (stored.config, Some(stored.raw)),
            None => (UrlConfig::default(), None),
        };

        let mut changed = Vec::new();
        for field in UrlField::ALL {
            let Some(raw) = update.get(field) else {
                continue;
            };
            let urls = validation::parse_field(field, raw).map_err(|err| {
                warn!(
                    field = field.name(),
                    error = %redact_url(&err.to_string()),
                    "Rejected URL configuration write"
                );
                err
            })?;
            debug!(field = field.name(), urls = %redact_urls(&urls), "Setting URL list");
            config.set_urls(field, urls);
            changed.push(field.name());
        }

        if self.store.supports_compare_and_swap() {
            self.store
                .save_if_unchanged(&config, expected)
                .await
                .map_err(|err| {
                    if matches!(err, UrlConfigError::ConcurrentModification) {
                        warn!("URL configuration changed during write; update not applied");
                    }
                    err
                })?;
        } else {
            self.store.save(&config).await?;
        }

        info!(fields = ?changed, "URL configuration updated");
        Ok(())
    }

    /// Dispatches a logical request for the `config/urls` path.
    ///
    /// Caller mistakes on write come back as an error [`Response`]; storage
    /// and encoding failures are returned as `Err`.
    pub async fn handle_request(&self, request: &Request) -> Result<Option<Response>> {
        if request.path != URLS_PATH {
            return Err(UrlConfigError::UnsupportedPath(request.path.clone()));
        }

        match request.operation {
            Operation::Read => self.read().await,
            Operation::Write => {
                let outcome = match UrlConfigUpdate::from_data(&request.data) {
                    Ok(update) => self.write(&update).await,
                    Err(err) => Err(err),
                };
                match outcome {
                    Ok(()) => Ok(None),
                    Err(err) if err.is_user_error() => Ok(Some(Response::error(err.to_string()))),
                    Err(err) => Err(err),
                }
            }
        }
    }
}
