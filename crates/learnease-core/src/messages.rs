//! The JSON message surface.
//!
//! Each request is an object tagged by `type`; each gets exactly one
//! response object back. Malformed requests produce `{"error": ...}` and
//! never take the host down.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pomodoro::{PomodoroController, PomodoroSettings, PomodoroState};
use crate::reading::ReadingTimer;

/// Largest accepted duration, one day in minutes.
pub const MAX_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    #[serde(alias = "START_POMODORO")]
    Start,
    #[serde(alias = "PAUSE_POMODORO")]
    Pause,
    #[serde(alias = "RESET_POMODORO")]
    Reset,
    #[serde(alias = "SET_POMODORO_DURATIONS")]
    SetDurations {
        work_minutes: f64,
        break_minutes: f64,
    },
    #[serde(alias = "SET_POMODORO_SETTINGS")]
    SetSettings {
        work_minutes: f64,
        break_minutes: f64,
        long_break_minutes: f64,
        cycles_before_long_break: f64,
    },
    #[serde(alias = "GET_POMODORO_STATE")]
    GetState,
    Ping,
    StartReading {
        url: String,
    },
    PauseReading,
    ResumeReading,
    StopReading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Started { started: bool },
    Paused { paused: bool },
    Reset { reset: bool },
    Updated { updated: bool },
    Resumed { resumed: bool },
    Stopped { stopped: bool },
    Pong { pong: bool },
    State(PomodoroState),
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }
}

/// Floor a caller-supplied duration into `1..=MAX_MINUTES`.
/// Non-finite input becomes 1.
pub fn clamp_minutes(value: f64) -> u32 {
    if !value.is_finite() {
        return 1;
    }
    value.floor().clamp(1.0, f64::from(MAX_MINUTES)) as u32
}

/// Routes requests to the timers it was built with.
#[derive(Clone)]
pub struct MessageRouter {
    pomodoro: PomodoroController,
    reading: ReadingTimer,
}

impl MessageRouter {
    pub fn new(pomodoro: PomodoroController, reading: ReadingTimer) -> Self {
        Self { pomodoro, reading }
    }

    pub fn pomodoro(&self) -> &PomodoroController {
        &self.pomodoro
    }

    pub fn reading(&self) -> &ReadingTimer {
        &self.reading
    }

    pub fn handle(&self, request: Request) -> Response {
        debug!(?request, "handling message");
        match request {
            Request::Start => {
                self.pomodoro.start();
                Response::Started { started: true }
            }
            Request::Pause => {
                self.pomodoro.pause();
                Response::Paused { paused: true }
            }
            Request::Reset => {
                self.pomodoro.reset();
                Response::Reset { reset: true }
            }
            Request::SetDurations {
                work_minutes,
                break_minutes,
            } => {
                self.pomodoro
                    .set_durations(clamp_minutes(work_minutes), clamp_minutes(break_minutes));
                Response::Updated { updated: true }
            }
            Request::SetSettings {
                work_minutes,
                break_minutes,
                long_break_minutes,
                cycles_before_long_break,
            } => {
                self.pomodoro.set_settings(PomodoroSettings {
                    work_minutes: clamp_minutes(work_minutes),
                    break_minutes: clamp_minutes(break_minutes),
                    long_break_minutes: clamp_minutes(long_break_minutes),
                    cycles_before_long_break: clamp_minutes(cycles_before_long_break),
                });
                Response::Updated { updated: true }
            }
            Request::GetState => Response::State(self.pomodoro.get_state()),
            Request::Ping => Response::Pong { pong: true },
            Request::StartReading { url } => {
                self.reading.start(&url);
                Response::Started { started: true }
            }
            Request::PauseReading => {
                self.reading.pause();
                Response::Paused { paused: true }
            }
            Request::ResumeReading => {
                self.reading.resume();
                Response::Resumed { resumed: true }
            }
            Request::StopReading => {
                self.reading.stop();
                Response::Stopped { stopped: true }
            }
        }
    }

    /// Parse one JSON message and handle it.
    pub fn handle_json(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "rejected malformed message");
                Response::error(e.to_string())
            }
        }
    }
}
