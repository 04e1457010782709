//! Error types for wm-console

use std::collections::BTreeMap;

use thiserror::Error;

use crate::EntityKind;

/// Field name to message, as shown inline next to form inputs
pub type FieldErrors = BTreeMap<String, String>;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Key/value storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage data corrupted: {0}")]
    Corrupted(String),
}

/// Failure to get any HTTP response at all
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Connection(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Normalized failure of a backend call.
///
/// `code` is the HTTP status, or 0 when no response was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: u16,
    pub fields: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: FieldErrors) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Build from a transport failure (no response)
    pub fn transport(err: &TransportError) -> Self {
        Self::new(err.to_string(), 0)
    }

    pub fn is_transport(&self) -> bool {
        self.code == 0
    }

    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }

    pub fn is_conflict(&self) -> bool {
        self.code == 409
    }

    pub fn is_validation(&self) -> bool {
        self.code == 422
    }

    pub fn is_auth(&self) -> bool {
        matches!(self.code, 401 | 403)
    }

    /// Message for a single field, if the server reported one
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .as_ref()
            .and_then(|f| f.get(name))
            .map(String::as_str)
    }
}

/// Name-to-identifier resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No {0} reference given")]
    Empty(EntityKind),

    #[error("{kind} not found: {input}")]
    NotFound { kind: EntityKind, input: String },

    #[error("Failed to list {kind}s: {source}")]
    Lookup {
        kind: EntityKind,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("Invalid input: {}", format_fields(.0))]
    Validation(FieldErrors),

    #[error("{0}")]
    NotConfigured(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to open browser: {0}")]
    Browser(String),
}

impl Error {
    /// Field errors carried by this error, from the server or local validation
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Error::Api(e) => e.fields.as_ref(),
            Error::Validation(fields) => Some(fields),
            _ => None,
        }
    }

    /// HTTP status for API failures, 0 otherwise
    pub fn code(&self) -> u16 {
        match self {
            Error::Api(e) => e.code,
            Error::Resolve(ResolveError::Lookup { source, .. }) => source.code,
            _ => 0,
        }
    }
}

fn format_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
