mod controller;
mod state;

pub use controller::PomodoroController;
pub use state::{
    Mode, PhaseTransition, PomodoroSettings, PomodoroState, TickOutcome, NOTIFICATION_TITLE,
};
