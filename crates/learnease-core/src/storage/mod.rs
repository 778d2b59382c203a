mod config;
pub mod database;
mod memory;

pub use config::{Config, NotificationsConfig, PomodoroConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, StorageError};

/// A durable key-value store keyed by field name.
///
/// Values are JSON documents. Implementations must be shareable across the
/// tick task and the message handlers, hence `Send + Sync`.
pub trait KeyValueStore: Send + Sync {
    /// Read a single key. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write several keys at once. Either all entries land or none do.
    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StorageError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }
}

/// Read `key` and decode it as `T`.
pub fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Encode `value` and write it under `key`.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_value(value).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, json)
}

/// Returns `~/.config/learnease[-dev]/` based on LEARNEASE_ENV.
///
/// Set LEARNEASE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LEARNEASE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("learnease-dev")
    } else {
        base_dir.join("learnease")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
