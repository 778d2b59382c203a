//! In-process key-value store.
//!
//! Backs `learnease serve --memory` and the test suites. A store can be put
//! into a failing mode to exercise the write-failure path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::KeyValueStore;
use crate::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    reject_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `WriteRejected` until cleared.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of successful `set_many` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::QueryFailed("memory store mutex poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected("quota exceeded".into()));
        }
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejected_writes_leave_entries_untouched() {
        let store = MemoryStore::new();
        store.set("mode", json!("work")).unwrap();
        store.set_reject_writes(true);
        assert!(store.set("mode", json!("break")).is_err());
        assert_eq!(store.get("mode").unwrap(), Some(json!("work")));
        assert_eq!(store.write_count(), 1);
    }
}
