use crate::error::{Result, UrlConfigError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The stored URL record embedded into issued certificates.
///
/// Missing lists decode as empty so older or partial records stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlConfig {
    #[serde(default)]
    pub issuing_certificates: Vec<String>,
    #[serde(default)]
    pub crl_distribution_points: Vec<String>,
    #[serde(default)]
    pub ocsp_servers: Vec<String>,
}

impl UrlConfig {
    pub fn urls(&self, field: UrlField) -> &[String] {
        match field {
            UrlField::IssuingCertificates => &self.issuing_certificates,
            UrlField::CrlDistributionPoints => &self.crl_distribution_points,
            UrlField::OcspServers => &self.ocsp_servers,
        }
    }

    pub fn set_urls(&mut self, field: UrlField, urls: Vec<String>) {
        match field {
            UrlField::IssuingCertificates => self.issuing_certificates = urls,
            UrlField::CrlDistributionPoints => self.crl_distribution_points = urls,
            UrlField::OcspServers => self.ocsp_servers = urls,
        }
    }

    /// Flat field-name to URL-list view used for read responses.
    pub fn to_data(&self) -> Map<String, Value> {
        UrlField::ALL
            .iter()
            .map(|field| {
                let urls = self
                    .urls(*field)
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect();
                (field.name().to_string(), Value::Array(urls))
            })
            .collect()
    }
}

/// One of the three independent URL lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlField {
    IssuingCertificates,
    CrlDistributionPoints,
    OcspServers,
}

impl UrlField {
    pub const ALL: [UrlField; 3] = [
        UrlField::IssuingCertificates,
        UrlField::CrlDistributionPoints,
        UrlField::OcspServers,
    ];

    /// Wire and storage name of the field.
    pub fn name(self) -> &'static str {
        match self {
            UrlField::IssuingCertificates => "issuing_certificates",
            UrlField::CrlDistributionPoints => "crl_distribution_points",
            UrlField::OcspServers => "ocsp_servers",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UrlField::IssuingCertificates => "issuing certificates",
            UrlField::CrlDistributionPoints => "CRL distribution points",
            UrlField::OcspServers => "OCSP servers",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UrlField::IssuingCertificates => {
                "Comma-separated list of URLs for the issuing certificate attribute"
            }
            UrlField::CrlDistributionPoints => {
                "Comma-separated list of URLs for the CRL distribution points attribute"
            }
            UrlField::OcspServers => "Comma-separated list of URLs for the OCSP servers attribute",
        }
    }
}

impl fmt::Display for UrlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Partial update of the record.
///
/// `None` leaves a field untouched; `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_certificates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crl_distribution_points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocsp_servers: Option<String>,
}

impl UrlConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: UrlField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            UrlField::IssuingCertificates => self.issuing_certificates = value,
            UrlField::CrlDistributionPoints => self.crl_distribution_points = value,
            UrlField::OcspServers => self.ocsp_servers = value,
        }
        self
    }

    pub fn get(&self, field: UrlField) -> Option<&str> {
        match field {
            UrlField::IssuingCertificates => self.issuing_certificates.as_deref(),
            UrlField::CrlDistributionPoints => self.crl_distribution_points.as_deref(),
            UrlField::OcspServers => self.ocsp_servers.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        UrlField::ALL.iter().all(|field| self.get(*field).is_none())
    }

    /// Builds an update from untyped request data.
    ///
    /// Unknown keys and `null` values are ignored; any other non-string value
    /// for a known field is rejected.
    pub fn from_data(data: &Map<String, Value>) -> Result<Self> {
        let mut update = Self::new();
        for field in UrlField::ALL {
            match data.get(field.name()) {
                None | Some(Value::Null) => {}
                Some(Value::String(value)) => update = update.with(field, value.as_str()),
                Some(other) => {
                    return Err(UrlConfigError::InvalidRequest(format!(
                        "field '{}' must be a comma-separated string, got {}",
                        field.name(),
                        other
                    )))
                }
            }
        }
        Ok(update)
    }
}
