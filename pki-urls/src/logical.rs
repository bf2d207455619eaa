//! Request/response framing and path metadata for the dispatch layer

use crate::models::UrlField;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path the URL configuration is served under.
pub const URLS_PATH: &str = "config/urls";

pub const HELP_SYNOPSIS: &str =
    "Configure the issuing CA, CRL distribution point and OCSP server URLs.";

pub const HELP_DESCRIPTION: &str = "\
Sets the issuing CA, CRL distribution point and OCSP server URLs that are
written into issued certificates. Unset lists add nothing to certificates.
Each field takes a comma-separated list of URLs. Writing a field replaces
that list only; fields left out of a write keep their current value. Write
an empty string to a field to clear it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Request {
    pub fn read(path: impl Into<String>) -> Self {
        Self {
            operation: Operation::Read,
            path: path.into(),
            data: Map::new(),
        }
    }

    pub fn write(path: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            operation: Operation::Write,
            path: path.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Map<String, Value>,
}

impl Response {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// A non-fatal error response carrying a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("error".to_string(), Value::String(message.into()));
        Self { data }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.data.get("error").and_then(Value::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub description: &'static str,
}

/// Registration metadata for a served path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDescriptor {
    pub pattern: &'static str,
    pub fields: Vec<FieldSchema>,
    pub operations: Vec<Operation>,
    pub help_synopsis: &'static str,
    pub help_description: &'static str,
}

impl PathDescriptor {
    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

pub fn urls_path() -> PathDescriptor {
    PathDescriptor {
        pattern: URLS_PATH,
        fields: UrlField::ALL
            .iter()
            .map(|field| FieldSchema {
                name: field.name(),
                description: field.description(),
            })
            .collect(),
        operations: vec![Operation::Read, Operation::Write],
        help_synopsis: HELP_SYNOPSIS,
        help_description: HELP_DESCRIPTION,
    }
}
