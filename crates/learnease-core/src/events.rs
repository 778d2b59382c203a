use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pomodoro::Mode;

/// Every state change in a timer produces an Event.
/// Subscribers (stats recording, UI surfaces) receive them over a broadcast
/// channel; a missing subscriber never blocks the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    PomodoroStarted {
        mode: Mode,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    PomodoroPaused {
        mode: Mode,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    PomodoroReset {
        at: DateTime<Utc>,
    },
    /// A phase ran out and the next one began.
    PhaseCompleted {
        from: Mode,
        to: Mode,
        /// Configured length of the phase that just ended.
        minutes: u32,
        cycle_count: u32,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        work_minutes: u32,
        break_minutes: u32,
        long_break_minutes: u32,
        cycles_before_long_break: u32,
        at: DateTime<Utc>,
    },
    ReadingStarted {
        url: String,
        at: DateTime<Utc>,
    },
    ReadingStopped {
        url: String,
        seconds: u64,
        at: DateTime<Utc>,
    },
}
