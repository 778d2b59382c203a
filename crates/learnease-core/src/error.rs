//! Core error types for learnease-core.
//!
//! Errors are grouped by subsystem with thiserror. The pomodoro and reading
//! controllers never surface these to their callers; they are reported as
//! notifications instead. One-shot operations (journal, notes, config)
//! propagate them with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for learnease-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised by a [`crate::storage::KeyValueStore`].
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another process
    #[error("Database is locked")]
    Locked,

    /// The store refused the write (quota, read-only medium, ...)
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    /// A stored value could not be decoded
    #[error("Corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Index out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// No record with the given id
    #[error("No {collection} entry with id '{id}'")]
    NotFound { collection: String, id: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => match e.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    StorageError::Locked
                }
                rusqlite::ErrorCode::DiskFull | rusqlite::ErrorCode::ReadOnly => {
                    StorageError::WriteRejected(err.to_string())
                }
                _ => StorageError::QueryFailed(err.to_string()),
            },
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::WriteRejected("quota exceeded".into()).into();
        assert_eq!(err.to_string(), "Storage error: Write rejected: quota exceeded");
    }

    #[test]
    fn not_found_message_names_collection() {
        let err = ValidationError::NotFound {
            collection: "sticky note".into(),
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "No sticky note entry with id 'abc'");
    }
}
