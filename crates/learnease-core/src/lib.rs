//! # LearnEase Core Library
//!
//! Core logic for the LearnEase study companion: a background pomodoro
//! timer plus a handful of study tools that share one key-value store.
//! The `learnease` CLI is a thin host over this crate.
//!
//! ## Architecture
//!
//! - **Pomodoro**: a pure per-second transition function on
//!   [`PomodoroState`], driven by [`PomodoroController`] through a single
//!   tokio tick task
//! - **Storage**: a [`KeyValueStore`] trait backed by SQLite ([`Database`])
//!   or memory ([`MemoryStore`]), plus TOML configuration ([`Config`])
//! - **Messages**: the JSON request/response surface ([`MessageRouter`])
//! - **Study tools**: reading timer, text statistics, journal, sticky notes,
//!   focus blocker and weekly study stats
//!
//! ## Key Components
//!
//! - [`PomodoroController`]: the process-wide timer service
//! - [`ReadingTimer`]: per-page count-up timer
//! - [`StudyStats`]: weekly hours, streaks and badges

pub mod blocker;
pub mod error;
pub mod events;
pub mod journal;
pub mod messages;
pub mod notes;
pub mod notify;
pub mod pomodoro;
pub mod reading;
pub mod stats;
pub mod storage;
pub mod text;
pub mod ticker;

pub use blocker::FocusBlocker;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use journal::{Journal, JournalEntry};
pub use messages::{MessageRouter, Request, Response};
pub use notes::{StickyNote, StickyNotes};
pub use notify::{LogNotifier, Notification, Notifier};
pub use pomodoro::{Mode, PomodoroController, PomodoroSettings, PomodoroState};
pub use reading::{ReadingSession, ReadingTimer};
pub use stats::{StatsSummary, StudyStats, WeeklyStat};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use text::TextStats;
