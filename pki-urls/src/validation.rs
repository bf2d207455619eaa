//! URL list parsing and syntax validation
//!
//! Only well-formedness is checked. The URLs are metadata copied into issued
//! certificates; nothing here contacts them.

use crate::error::{Result, UrlConfigError};
use crate::models::UrlField;
use url::Url;

/// A list element that failed URL parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUrl {
    pub url: String,
    pub error: url::ParseError,
}

/// Splits a comma-separated value into trimmed URL strings.
///
/// Empty tokens are dropped, so an empty or whitespace-only value yields an
/// empty list (which clears the field) and a trailing comma is harmless.
pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks every element; the first unparseable one is returned.
pub fn validate_urls(urls: &[String]) -> std::result::Result<(), InvalidUrl> {
    for url in urls {
        if let Err(error) = Url::parse(url) {
            return Err(InvalidUrl {
                url: url.clone(),
                error,
            });
        }
    }
    Ok(())
}

/// Split and validate the new value for `field`.
pub fn parse_field(field: UrlField, raw: &str) -> Result<Vec<String>> {
    let urls = split_urls(raw);
    validate_urls(&urls).map_err(|invalid| UrlConfigError::Validation {
        field,
        url: invalid.url,
        source: invalid.error,
    })?;
    Ok(urls)
}
