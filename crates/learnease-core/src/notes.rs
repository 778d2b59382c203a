//! Sticky notes: a flat list of short colored notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, StorageError, ValidationError};
use crate::storage::{self, KeyValueStore};

const KEY_NOTES: &str = "stickyNotes";
pub const DEFAULT_COLOR: &str = "#fef08a";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: String,
    pub text: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct StickyNotes<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> StickyNotes<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<StickyNote>, StorageError> {
        Ok(storage::load(self.store, KEY_NOTES)?.unwrap_or_default())
    }

    pub fn add(&self, text: &str, color: Option<&str>) -> Result<StickyNote, StorageError> {
        let now = Utc::now();
        let note = StickyNote {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            color: color.unwrap_or(DEFAULT_COLOR).to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut notes = self.list()?;
        notes.push(note.clone());
        storage::save(self.store, KEY_NOTES, &notes)?;
        Ok(note)
    }

    pub fn update(&self, id: &str, text: &str) -> Result<StickyNote, CoreError> {
        let mut notes = self.list()?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found(id))?;
        note.text = text.to_string();
        note.updated_at = Utc::now();
        let updated = note.clone();
        storage::save(self.store, KEY_NOTES, &notes)?;
        Ok(updated)
    }

    pub fn remove(&self, id: &str) -> Result<StickyNote, CoreError> {
        let mut notes = self.list()?;
        let idx = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = notes.remove(idx);
        storage::save(self.store, KEY_NOTES, &notes)?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(KEY_NOTES)
    }
}

fn not_found(id: &str) -> ValidationError {
    ValidationError::NotFound {
        collection: "sticky note".into(),
        id: id.to_string(),
    }
}
