//! The process-wide pomodoro service.
//!
//! `PomodoroController` owns the single [`PomodoroState`], drives it with a
//! one-second [`Ticker`] while running, and writes the state through to the
//! key-value store after every tick and every mutating call. Clones share
//! the same state and ticker.
//!
//! Nothing here returns an error. A failed write is logged, surfaced once
//! as a notification, and retried implicitly by the next write; the
//! in-memory state stays authoritative.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::state::{PomodoroSettings, PomodoroState};
use crate::events::Event;
use crate::notify::{Notification, Notifier};
use crate::storage::KeyValueStore;
use crate::ticker::{TickFlow, Ticker};

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const EVENT_CAPACITY: usize = 64;

struct Shared {
    state: Mutex<PomodoroState>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<Event>,
    persist_failing: AtomicBool,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PomodoroState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &PomodoroState) {
        match state.persist(self.store.as_ref()) {
            Ok(()) => {
                if self.persist_failing.swap(false, Ordering::SeqCst) {
                    info!("pomodoro state saved again after earlier failures");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to persist pomodoro state");
                if !self.persist_failing.swap(true, Ordering::SeqCst) {
                    self.notifier.notify(&Notification::new(
                        "LearnEase storage error",
                        format!("Timer progress could not be saved: {e}"),
                    ));
                }
            }
        }
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn on_tick(&self) -> TickFlow {
        let mut state = self.lock_state();
        if !state.running {
            return TickFlow::Stop;
        }
        let outcome = state.tick();
        self.persist(&state);
        drop(state);

        for notification in &outcome.notifications {
            self.notifier.notify(notification);
        }
        if let Some(t) = outcome.transition {
            info!(from = ?t.from, to = ?t.to, cycle_count = t.cycle_count, "pomodoro phase completed");
            self.emit(Event::PhaseCompleted {
                from: t.from,
                to: t.to,
                minutes: t.minutes,
                cycle_count: t.cycle_count,
                at: Utc::now(),
            });
        }
        TickFlow::Continue
    }
}

#[derive(Clone)]
pub struct PomodoroController {
    shared: Arc<Shared>,
    ticker: Ticker,
    tick_interval: Duration,
}

impl PomodoroController {
    /// Restore the timer from `store`, falling back to `defaults` for
    /// anything never saved. The restored timer is paused.
    pub fn init(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        defaults: PomodoroSettings,
    ) -> Self {
        let state = PomodoroState::restore(store.as_ref(), defaults);
        info!(
            mode = ?state.mode,
            seconds_left = state.seconds_left,
            cycle_count = state.cycle_count,
            "pomodoro state restored"
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                store,
                notifier,
                events,
                persist_failing: AtomicBool::new(false),
            }),
            ticker: Ticker::new(),
            tick_interval: TICK_INTERVAL,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> PomodoroState {
        self.shared.lock_state().clone()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// Begin counting down. Calling this while already running only
    /// re-persists the state; no second tick task is created.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut state = self.shared.lock_state();
        if state.running && self.ticker.is_running() {
            debug!("pomodoro already running");
            self.shared.persist(&state);
            return;
        }
        state.running = true;
        self.shared.persist(&state);
        let (mode, seconds_left) = (state.mode, state.seconds_left);
        drop(state);

        let shared = self.shared.clone();
        self.ticker.start(self.tick_interval, move || shared.on_tick());
        info!(?mode, seconds_left, "pomodoro started");
        self.shared.emit(Event::PomodoroStarted {
            mode,
            seconds_left,
            at: Utc::now(),
        });
    }

    /// Stop counting down, keeping the remaining time.
    pub fn pause(&self) {
        self.ticker.stop();
        let mut state = self.shared.lock_state();
        let was_running = state.running;
        state.running = false;
        self.shared.persist(&state);
        let (mode, seconds_left) = (state.mode, state.seconds_left);
        drop(state);

        if was_running {
            info!(?mode, seconds_left, "pomodoro paused");
            self.shared.emit(Event::PomodoroPaused {
                mode,
                seconds_left,
                at: Utc::now(),
            });
        }
    }

    /// Stop and return to the start of a fresh work phase.
    pub fn reset(&self) {
        self.ticker.stop();
        let mut state = self.shared.lock_state();
        state.reset();
        self.shared.persist(&state);
        drop(state);

        info!("pomodoro reset");
        self.shared.emit(Event::PomodoroReset { at: Utc::now() });
    }

    pub fn set_durations(&self, work_minutes: u32, break_minutes: u32) {
        let mut state = self.shared.lock_state();
        state.set_durations(work_minutes, break_minutes);
        self.after_settings_change(state);
    }

    pub fn set_settings(&self, settings: PomodoroSettings) {
        let mut state = self.shared.lock_state();
        state.set_settings(settings);
        self.after_settings_change(state);
    }

    fn after_settings_change(&self, state: MutexGuard<'_, PomodoroState>) {
        self.shared.persist(&state);
        let settings = state.settings();
        drop(state);

        info!(?settings, "pomodoro settings updated");
        self.shared.emit(Event::SettingsUpdated {
            work_minutes: settings.work_minutes,
            break_minutes: settings.break_minutes,
            long_break_minutes: settings.long_break_minutes,
            cycles_before_long_break: settings.cycles_before_long_break,
            at: Utc::now(),
        });
    }

    /// Stop the tick task. The persisted state is left as is.
    pub fn shutdown(&self) {
        self.ticker.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::pomodoro::Mode;
    use crate::storage::MemoryStore;
    use tokio::time::sleep;

    fn controller(store: Arc<MemoryStore>) -> (PomodoroController, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let c = PomodoroController::init(store, notifier.clone(), PomodoroSettings::default());
        (c, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_ticks_once_per_second() {
        let (c, _) = controller(Arc::new(MemoryStore::new()));
        c.start();
        c.start();
        assert!(c.get_state().running);

        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(c.get_state().seconds_left, 1490);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_start_loses_no_time() {
        let (c, _) = controller(Arc::new(MemoryStore::new()));
        c.start();
        sleep(Duration::from_millis(3_500)).await;
        c.pause();
        let paused_at = c.get_state().seconds_left;
        assert_eq!(paused_at, 1497);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(c.get_state().seconds_left, paused_at);
        assert!(!c.is_ticking());

        c.start();
        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(c.get_state().seconds_left, paused_at - 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticking() {
        let (c, _) = controller(Arc::new(MemoryStore::new()));
        c.start();
        sleep(Duration::from_millis(5_500)).await;
        c.reset();
        sleep(Duration::from_secs(5)).await;

        let state = c.get_state();
        assert_eq!(state.seconds_left, 1500);
        assert_eq!(state.mode, Mode::Work);
        assert!(!state.running);
    }

    #[tokio::test(start_paused = true)]
    async fn every_tick_is_written_through() {
        let store = Arc::new(MemoryStore::new());
        let (c, _) = controller(store.clone());
        c.start();
        let after_start = store.write_count();
        sleep(Duration::from_millis(4_500)).await;
        assert_eq!(store.write_count(), after_start + 4);
        assert_eq!(
            store.get("secondsLeft").unwrap(),
            Some(serde_json::json!(1496))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn storage_failure_notifies_once_and_keeps_counting() {
        let store = Arc::new(MemoryStore::new());
        let (c, notifier) = controller(store.clone());
        store.set_reject_writes(true);
        c.start();
        sleep(Duration::from_millis(5_500)).await;

        assert_eq!(c.get_state().seconds_left, 1495);
        let errors: Vec<_> = notifier
            .notifications()
            .into_iter()
            .filter(|n| n.title == "LearnEase storage error")
            .collect();
        assert_eq!(errors.len(), 1);

        store.set_reject_writes(false);
        sleep(Duration::from_secs(1)).await;
        assert_eq!(
            store.get("secondsLeft").unwrap(),
            Some(serde_json::json!(1494))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn phase_completion_is_broadcast() {
        let store = Arc::new(MemoryStore::new());
        let (c, _) = controller(store);
        c.set_settings(PomodoroSettings {
            work_minutes: 1,
            break_minutes: 1,
            long_break_minutes: 1,
            cycles_before_long_break: 2,
        });
        c.set_durations(1, 1);
        let mut rx = c.subscribe();
        c.start();

        let started = rx.recv().await.unwrap();
        assert!(matches!(started, Event::PomodoroStarted { .. }));
        match rx.recv().await.unwrap() {
            Event::PhaseCompleted {
                from,
                to,
                minutes,
                cycle_count,
                ..
            } => {
                assert_eq!((from, to, minutes, cycle_count), (Mode::Work, Mode::Break, 1, 1));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
