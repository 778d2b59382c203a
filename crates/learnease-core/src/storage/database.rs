//! SQLite-backed key-value store.
//!
//! Every value is a JSON document in a single `kv` table. This is the
//! durable store the pomodoro controller writes through on every tick.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use serde_json::Value;

use super::{data_dir, KeyValueStore};
use crate::error::{CoreError, StorageError};

/// SQLite database holding the key-value table.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/learnease/learnease.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("learnease.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::QueryFailed("connection mutex poisoned".into()))
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(())
    }

}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let raw = match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at)
                 VALUES (?1, ?2, datetime('now'))",
                params![key, value.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.get("mode").unwrap().is_none());
        db.set("mode", json!("work")).unwrap();
        assert_eq!(db.get("mode").unwrap(), Some(json!("work")));
    }

    #[test]
    fn set_many_overwrites_and_remove_deletes() {
        let db = Database::open_memory().unwrap();
        db.set_many(&[("secondsLeft", json!(1500)), ("running", json!(false))])
            .unwrap();
        db.set_many(&[("secondsLeft", json!(1499))]).unwrap();
        assert_eq!(db.get("secondsLeft").unwrap(), Some(json!(1499)));
        assert_eq!(db.get("running").unwrap(), Some(json!(false)));

        db.remove("running").unwrap();
        db.remove("running").unwrap();
        assert!(db.get("running").unwrap().is_none());
    }

    #[test]
    fn reopening_a_file_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learnease.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.set("journal", json!([{"text": "hi", "date": "2024-01-01"}]))
                .unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(
            db.get("journal").unwrap(),
            Some(json!([{"text": "hi", "date": "2024-01-01"}]))
        );
    }
}
