//! Per-page reading timer.
//!
//! A count-up clock for the page being read. While active and not paused
//! every tick adds a second and saves the page's session, so the time
//! survives the page (or the process) going away. Sessions are kept one per
//! URL under `readingSessions`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::events::Event;
use crate::storage::{self, KeyValueStore};
use crate::ticker::{TickFlow, Ticker};

pub const READING_SESSIONS_KEY: &str = "readingSessions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub url: String,
    /// Seconds spent on the page in the latest reading run.
    pub time_spent: u64,
    pub last_accessed: NaiveDate,
}

pub fn list_sessions(store: &dyn KeyValueStore) -> Result<Vec<ReadingSession>, StorageError> {
    Ok(storage::load(store, READING_SESSIONS_KEY)?.unwrap_or_default())
}

/// Replace the session for `session.url`, or append it.
pub fn upsert_session(
    store: &dyn KeyValueStore,
    session: ReadingSession,
) -> Result<(), StorageError> {
    let mut sessions = list_sessions(store)?;
    match sessions.iter_mut().find(|s| s.url == session.url) {
        Some(existing) => *existing = session,
        None => sessions.push(session),
    }
    storage::save(store, READING_SESSIONS_KEY, &sessions)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingState {
    pub active: bool,
    pub paused: bool,
    pub seconds: u64,
    pub url: Option<String>,
}

impl ReadingState {
    /// Count one second. Returns whether the second counted.
    fn tick(&mut self) -> bool {
        if self.active && !self.paused {
            self.seconds += 1;
            true
        } else {
            false
        }
    }

    fn session(&self, today: NaiveDate) -> Option<ReadingSession> {
        self.url.as_ref().map(|url| ReadingSession {
            url: url.clone(),
            time_spent: self.seconds,
            last_accessed: today,
        })
    }
}

struct Shared {
    state: Mutex<ReadingState>,
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<Event>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, ReadingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, state: &ReadingState) -> Option<ReadingSession> {
        let session = state.session(Local::now().date_naive())?;
        if let Err(e) = upsert_session(self.store.as_ref(), session.clone()) {
            warn!(url = %session.url, error = %e, "failed to save reading session");
        }
        Some(session)
    }

    fn on_tick(&self) -> TickFlow {
        let mut state = self.lock_state();
        if !state.active {
            return TickFlow::Stop;
        }
        if state.tick() {
            self.save(&state);
        }
        TickFlow::Continue
    }
}

#[derive(Clone)]
pub struct ReadingTimer {
    shared: Arc<Shared>,
    ticker: Ticker,
}

impl ReadingTimer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ReadingState::default()),
                store,
                events,
            }),
            ticker: Ticker::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    pub fn state(&self) -> ReadingState {
        self.shared.lock_state().clone()
    }

    /// Start timing `url`. Ignored while a reading run is already active.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, url: &str) {
        let mut state = self.shared.lock_state();
        if state.active {
            return;
        }
        *state = ReadingState {
            active: true,
            paused: false,
            seconds: 0,
            url: Some(url.to_string()),
        };
        drop(state);

        let shared = self.shared.clone();
        self.ticker
            .start(Duration::from_secs(1), move || shared.on_tick());
        info!(url, "reading timer started");
        let _ = self.shared.events.send(Event::ReadingStarted {
            url: url.to_string(),
            at: Utc::now(),
        });
    }

    pub fn pause(&self) {
        self.shared.lock_state().paused = true;
    }

    pub fn resume(&self) {
        self.shared.lock_state().paused = false;
    }

    /// Stop timing, save the session and zero the counter.
    pub fn stop(&self) -> Option<ReadingSession> {
        self.ticker.stop();
        let mut state = self.shared.lock_state();
        let session = self.shared.save(&state);
        *state = ReadingState::default();
        drop(state);

        if let Some(session) = &session {
            info!(url = %session.url, seconds = session.time_spent, "reading timer stopped");
            let _ = self.shared.events.send(Event::ReadingStopped {
                url: session.url.clone(),
                seconds: session.time_spent,
                at: Utc::now(),
            });
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use tokio::time::sleep;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn upsert_replaces_by_url() {
        let store = MemoryStore::new();
        upsert_session(
            &store,
            ReadingSession {
                url: "https://a.example".into(),
                time_spent: 10,
                last_accessed: day(1),
            },
        )
        .unwrap();
        upsert_session(
            &store,
            ReadingSession {
                url: "https://b.example".into(),
                time_spent: 5,
                last_accessed: day(1),
            },
        )
        .unwrap();
        upsert_session(
            &store,
            ReadingSession {
                url: "https://a.example".into(),
                time_spent: 42,
                last_accessed: day(2),
            },
        )
        .unwrap();

        let sessions = list_sessions(&store).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].time_spent, 42);
        assert_eq!(sessions[0].last_accessed, day(2));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_seconds_do_not_count() {
        let store = Arc::new(MemoryStore::new());
        let timer = ReadingTimer::new(store.clone());
        timer.start("https://docs.rs");
        sleep(Duration::from_millis(3_500)).await;
        timer.pause();
        sleep(Duration::from_secs(10)).await;
        timer.resume();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(timer.state().seconds, 5);
        let saved = list_sessions(store.as_ref()).unwrap();
        assert_eq!(saved[0].time_spent, 5);

        let session = timer.stop().unwrap();
        assert_eq!(session.url, "https://docs.rs");
        assert_eq!(session.time_spent, 5);
        assert_eq!(timer.state(), ReadingState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_keeps_first_url() {
        let timer = ReadingTimer::new(Arc::new(MemoryStore::new()));
        timer.start("https://first.example");
        timer.start("https://second.example");
        sleep(Duration::from_millis(1_500)).await;
        let state = timer.state();
        assert_eq!(state.url.as_deref(), Some("https://first.example"));
        assert_eq!(state.seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_and_stop_are_broadcast() {
        let timer = ReadingTimer::new(Arc::new(MemoryStore::new()));
        let mut rx = timer.subscribe();
        timer.start("https://docs.rs");
        sleep(Duration::from_millis(2_500)).await;
        timer.stop();

        match rx.recv().await.unwrap() {
            Event::ReadingStarted { url, .. } => assert_eq!(url, "https://docs.rs"),
            other => panic!("unexpected event {other:?}"),
        }
        match rx.recv().await.unwrap() {
            Event::ReadingStopped { url, seconds, .. } => {
                assert_eq!((url.as_str(), seconds), ("https://docs.rs", 2));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn stop_without_start_saves_nothing() {
        let store = Arc::new(MemoryStore::new());
        let timer = ReadingTimer::new(store.clone());
        assert!(timer.stop().is_none());
        assert!(list_sessions(store.as_ref()).unwrap().is_empty());
    }
}
