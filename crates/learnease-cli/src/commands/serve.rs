//! `learnease serve`: the long-lived message host.
//!
//! Reads one JSON request per stdin line and answers with one JSON line on
//! stdout. Logs go to stderr. The host exits when stdin closes.

use std::sync::Arc;

use chrono::Local;
use learnease_core::pomodoro::Mode;
use learnease_core::{
    Config, Database, Event, KeyValueStore, LogNotifier, MemoryStore, MessageRouter,
    Notification, Notifier, PomodoroController, PomodoroSettings, ReadingTimer, Response,
    StudyStats,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::notifier::DesktopNotifier;

pub fn run(memory: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store: Arc<dyn KeyValueStore> = if memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(Database::open()?)
    };
    let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
        Arc::new(DesktopNotifier)
    } else {
        Arc::new(LogNotifier)
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(store, notifier, config.pomodoro_settings()))
}

async fn serve(
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    defaults: PomodoroSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let pomodoro = PomodoroController::init(store.clone(), notifier.clone(), defaults);
    let reading = ReadingTimer::new(store.clone());
    let router = MessageRouter::new(pomodoro.clone(), reading.clone());
    let recorder = tokio::spawn(record_focus(pomodoro.subscribe(), store, notifier));

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut buf = Vec::new();
    info!("listening for messages on stdin");

    loop {
        buf.clear();
        if stdin.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => router.handle_json(line.trim_end()),
            Err(e) => {
                warn!(error = %e, "rejected message that is not UTF-8");
                Response::error(format!("message is not valid UTF-8: {e}"))
            }
        };
        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        // Nobody reading stdout is not an error.
        if stdout.write_all(out.as_bytes()).await.is_ok() {
            let _ = stdout.flush().await;
        }
    }

    info!("stdin closed, shutting down");
    pomodoro.shutdown();
    reading.stop();
    recorder.abort();
    Ok(())
}

/// Count every finished work phase toward today's study stats.
async fn record_focus(
    mut events: broadcast::Receiver<Event>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        match events.recv().await {
            Ok(Event::PhaseCompleted {
                from: Mode::Work,
                minutes,
                ..
            }) => {
                let today = Local::now().date_naive();
                match StudyStats::new(store.as_ref()).record_focus(today, minutes) {
                    Ok(badges) => {
                        for badge in badges {
                            info!(%badge, "badge earned");
                            notifier.notify(&Notification::new("LearnEase badge earned", badge));
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to record focus time"),
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "stats recorder fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
