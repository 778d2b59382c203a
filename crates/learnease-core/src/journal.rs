//! Saved writing and the word-count goal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, StorageError, ValidationError};
use crate::stats::StudyStats;
use crate::storage::{self, KeyValueStore};
use crate::text::TextStats;

const KEY_JOURNAL: &str = "journal";
const KEY_WORD_GOAL: &str = "wordGoal";
pub const DEFAULT_WORD_GOAL: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
    pub date: NaiveDate,
}

pub struct Journal<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> Journal<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Result<Vec<JournalEntry>, StorageError> {
        Ok(storage::load(self.store, KEY_JOURNAL)?.unwrap_or_default())
    }

    /// Append an entry and count its words toward the day's study stats.
    pub fn add(&self, text: &str, date: NaiveDate) -> Result<JournalEntry, CoreError> {
        if text.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "text".into(),
                message: "journal entry is empty".into(),
            }
            .into());
        }
        let entry = JournalEntry {
            text: text.to_string(),
            date,
        };
        let mut entries = self.entries()?;
        entries.push(entry.clone());
        storage::save(self.store, KEY_JOURNAL, &entries)?;

        let words = TextStats::compute(text).words as u64;
        if let Err(e) = StudyStats::new(self.store).record_words(date, words) {
            warn!(error = %e, "journal entry saved but study stats were not updated");
        }
        Ok(entry)
    }

    pub fn remove(&self, index: usize) -> Result<JournalEntry, CoreError> {
        let mut entries = self.entries()?;
        if index >= entries.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "journal".into(),
                index,
                len: entries.len(),
            }
            .into());
        }
        let removed = entries.remove(index);
        storage::save(self.store, KEY_JOURNAL, &entries)?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(KEY_JOURNAL)
    }

    /// Stored goal, or `fallback` if none was ever set.
    pub fn word_goal(&self, fallback: u32) -> Result<u32, StorageError> {
        Ok(storage::load(self.store, KEY_WORD_GOAL)?.unwrap_or(fallback))
    }

    /// Store a new goal, clamped to at least one word.
    pub fn set_word_goal(&self, goal: u32) -> Result<u32, StorageError> {
        let goal = goal.max(1);
        storage::save(self.store, KEY_WORD_GOAL, &goal)?;
        Ok(goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn add_and_remove_entries() {
        let store = MemoryStore::new();
        let journal = Journal::new(&store);
        journal.add("first thoughts", day()).unwrap();
        journal.add("second", day()).unwrap();
        assert_eq!(journal.entries().unwrap().len(), 2);

        let removed = journal.remove(0).unwrap();
        assert_eq!(removed.text, "first thoughts");
        assert!(matches!(
            journal.remove(5),
            Err(CoreError::Validation(ValidationError::OutOfBounds { len: 1, .. }))
        ));

        journal.clear().unwrap();
        assert!(journal.entries().unwrap().is_empty());
    }

    #[test]
    fn empty_entries_are_rejected() {
        let store = MemoryStore::new();
        assert!(Journal::new(&store).add("  \n", day()).is_err());
    }

    #[test]
    fn entries_feed_weekly_word_counts() {
        let store = MemoryStore::new();
        Journal::new(&store)
            .add("one two three four", day())
            .unwrap();
        let summary = StudyStats::new(&store).summary(day()).unwrap();
        assert_eq!(summary.weekly_stats[0].words, 4);
    }

    #[test]
    fn word_goal_defaults_and_clamps() {
        let store = MemoryStore::new();
        let journal = Journal::new(&store);
        assert_eq!(journal.word_goal(DEFAULT_WORD_GOAL).unwrap(), 500);
        assert_eq!(journal.set_word_goal(0).unwrap(), 1);
        journal.set_word_goal(4).unwrap();
        assert_eq!(journal.word_goal(DEFAULT_WORD_GOAL).unwrap(), 4);
    }
}
