//! Pomodoro state and its transition rules.
//!
//! The state machine cycles forever while running:
//!
//! ```text
//! Work -> Break -> Work -> ... -> Work -> LongBreak -> Work
//! ```
//!
//! Every `cycles_before_long_break`-th completed work phase is followed by
//! a long break instead of a short one. `tick()` is pure apart from the
//! mutation of `self`; scheduling and persistence live in the controller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::StorageError;
use crate::notify::Notification;
use crate::storage::KeyValueStore;

pub const NOTIFICATION_TITLE: &str = "LearnEase Pomodoro";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Work,
    Break,
    LongBreak,
}

impl Mode {
    /// Wire and storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::Break => "break",
            Mode::LongBreak => "longBreak",
        }
    }

    fn one_minute_warning(self) -> &'static str {
        match self {
            Mode::Work => "1 minute left in your focus session!",
            Mode::Break => "1 minute left in your break!",
            Mode::LongBreak => "1 minute left in your long break!",
        }
    }

    fn phase_ending(self) -> &'static str {
        match self {
            Mode::Work => "Focus session complete! Time for a break.",
            Mode::Break => "Break is over! Back to work.",
            Mode::LongBreak => "Long break is over! Ready for a new cycle?",
        }
    }
}

/// The four configurable values of a pomodoro timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettings {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
    pub cycles_before_long_break: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
        }
    }
}

impl PomodoroSettings {
    /// Every value raised to at least 1.
    pub fn clamped(self) -> Self {
        Self {
            work_minutes: self.work_minutes.max(1),
            break_minutes: self.break_minutes.max(1),
            long_break_minutes: self.long_break_minutes.max(1),
            cycles_before_long_break: self.cycles_before_long_break.max(1),
        }
    }
}

/// A phase change produced by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: Mode,
    pub to: Mode,
    /// Configured minutes of the phase that ended.
    pub minutes: u32,
    pub cycle_count: u32,
}

/// Everything one tick produced besides the state change itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub notifications: Vec<Notification>,
    pub transition: Option<PhaseTransition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroState {
    pub mode: Mode,
    pub seconds_left: u32,
    pub running: bool,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
    pub cycles_before_long_break: u32,
    pub cycle_count: u32,
}

impl Default for PomodoroState {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

// Storage keys, one per field.
const KEY_MODE: &str = "mode";
const KEY_SECONDS_LEFT: &str = "secondsLeft";
const KEY_RUNNING: &str = "running";
const KEY_WORK: &str = "workMinutes";
const KEY_BREAK: &str = "breakMinutes";
const KEY_LONG_BREAK: &str = "longBreakMinutes";
const KEY_CYCLES: &str = "cyclesBeforeLongBreak";
const KEY_CYCLE_COUNT: &str = "cycleCount";

impl PomodoroState {
    /// Fresh state: work phase, full duration, not running.
    pub fn new(settings: PomodoroSettings) -> Self {
        Self {
            mode: Mode::Work,
            seconds_left: settings.work_minutes.saturating_mul(60),
            running: false,
            work_minutes: settings.work_minutes,
            break_minutes: settings.break_minutes,
            long_break_minutes: settings.long_break_minutes,
            cycles_before_long_break: settings.cycles_before_long_break,
            cycle_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> PomodoroSettings {
        PomodoroSettings {
            work_minutes: self.work_minutes,
            break_minutes: self.break_minutes,
            long_break_minutes: self.long_break_minutes,
            cycles_before_long_break: self.cycles_before_long_break,
        }
    }

    /// Configured minutes of `mode`.
    pub fn phase_minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_minutes,
            Mode::Break => self.break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    pub fn phase_seconds(&self, mode: Mode) -> u32 {
        self.phase_minutes(mode).saturating_mul(60)
    }

    /// `mm:ss` rendering of `seconds_left`.
    pub fn formatted_time(&self) -> String {
        format!("{:02}:{:02}", self.seconds_left / 60, self.seconds_left % 60)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn reset(&mut self) {
        self.running = false;
        self.mode = Mode::Work;
        self.seconds_left = self.phase_seconds(Mode::Work);
        self.cycle_count = 0;
    }

    /// Update work and break minutes. If the active phase's duration
    /// changed, the countdown restarts at the new duration.
    pub fn set_durations(&mut self, work_minutes: u32, break_minutes: u32) {
        let before = self.phase_minutes(self.mode);
        self.work_minutes = work_minutes;
        self.break_minutes = break_minutes;
        let after = self.phase_minutes(self.mode);
        if before != after {
            self.seconds_left = self.phase_seconds(self.mode);
        }
    }

    /// Update all four settings, keeping the current countdown. A countdown
    /// longer than the (shortened) phase is cut down to the phase length.
    pub fn set_settings(&mut self, settings: PomodoroSettings) {
        self.work_minutes = settings.work_minutes;
        self.break_minutes = settings.break_minutes;
        self.long_break_minutes = settings.long_break_minutes;
        self.cycles_before_long_break = settings.cycles_before_long_break;
        self.seconds_left = self.seconds_left.min(self.phase_seconds(self.mode));
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.seconds_left == 60 {
            outcome.notifications.push(Notification::new(
                NOTIFICATION_TITLE,
                self.mode.one_minute_warning(),
            ));
        }
        if self.seconds_left == 1 {
            outcome
                .notifications
                .push(Notification::new(NOTIFICATION_TITLE, self.mode.phase_ending()));
        }

        if self.seconds_left <= 1 {
            outcome.transition = Some(self.advance_phase());
        } else {
            self.seconds_left -= 1;
        }
        outcome
    }

    fn advance_phase(&mut self) -> PhaseTransition {
        let from = self.mode;
        let minutes = self.phase_minutes(from);
        match from {
            Mode::Work => {
                self.cycle_count = self.cycle_count.saturating_add(1);
                if self.cycle_count % self.cycles_before_long_break.max(1) == 0 {
                    self.mode = Mode::LongBreak;
                } else {
                    self.mode = Mode::Break;
                }
            }
            Mode::Break => self.mode = Mode::Work,
            Mode::LongBreak => {
                self.mode = Mode::Work;
                self.cycle_count = 0;
            }
        }
        self.seconds_left = self.phase_seconds(self.mode);
        PhaseTransition {
            from,
            to: self.mode,
            minutes,
            cycle_count: self.cycle_count,
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Write every field under its own key.
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.set_many(&[
            (KEY_MODE, Value::from(self.mode.as_str())),
            (KEY_SECONDS_LEFT, self.seconds_left.into()),
            (KEY_RUNNING, self.running.into()),
            (KEY_WORK, self.work_minutes.into()),
            (KEY_BREAK, self.break_minutes.into()),
            (KEY_LONG_BREAK, self.long_break_minutes.into()),
            (KEY_CYCLES, self.cycles_before_long_break.into()),
            (KEY_CYCLE_COUNT, self.cycle_count.into()),
        ])
    }

    /// Rebuild state from the store, field by field.
    ///
    /// Missing or unreadable fields fall back to `defaults`. A restored
    /// timer is never running: the countdown task died with the process.
    pub fn restore(store: &dyn KeyValueStore, defaults: PomodoroSettings) -> Self {
        let mut state = Self::new(defaults);
        let settings = PomodoroSettings {
            work_minutes: read_field(store, KEY_WORK).unwrap_or(defaults.work_minutes),
            break_minutes: read_field(store, KEY_BREAK).unwrap_or(defaults.break_minutes),
            long_break_minutes: read_field(store, KEY_LONG_BREAK)
                .unwrap_or(defaults.long_break_minutes),
            cycles_before_long_break: read_field(store, KEY_CYCLES)
                .unwrap_or(defaults.cycles_before_long_break),
        }
        .clamped();
        state.set_settings(settings);
        state.mode = read_field(store, KEY_MODE).unwrap_or(Mode::Work);
        state.seconds_left = read_field::<u32>(store, KEY_SECONDS_LEFT)
            .unwrap_or_else(|| state.phase_seconds(state.mode))
            .min(state.phase_seconds(state.mode));
        state.cycle_count =
            read_field::<u32>(store, KEY_CYCLE_COUNT).unwrap_or(0) % state.cycles_before_long_break;
        state.running = false;
        state
    }
}

fn read_field<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match crate::storage::load(store, key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable pomodoro field");
            None
        }
    }
}
