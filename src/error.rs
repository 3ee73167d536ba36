//! Error types for the Stockroom inventory store.
//!
//! `StorageError` covers failures touching the backing files; `ApiError` is what
//! every `RecordService` operation returns. Malformed rows are never errors, see
//! [`crate::codec::RowWarning`].

use std::path::PathBuf;
use thiserror::Error;

use crate::types::LocationKey;

/// Failures at the filesystem / CSV layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Errors surfaced at the record service boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Record {id} is listed under {location} but its collection no longer contains it")]
    ConsistencyError { id: String, location: LocationKey },

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to render output: {0}")]
    OutputError(String),

    #[error("Failed to get user input: {0}")]
    InputError(String),
}

impl ApiError {
    /// Stable label used in JSON output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "validation",
            ApiError::RecordNotFound(_) => "not-found",
            ApiError::InvalidField(_) => "invalid-field",
            ApiError::ConsistencyError { .. } => "consistency",
            ApiError::StorageError(_) => "io",
            ApiError::ConfigError(_) => "config",
            ApiError::OutputError(_) => "output",
            ApiError::InputError(_) => "input",
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::StorageError(StorageError::IoError(err))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
