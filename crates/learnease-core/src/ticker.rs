//! A single repeating task per timer.
//!
//! `Ticker::start` spawns at most one interval task; calling it again while
//! the task is alive does nothing. The callback decides whether to keep
//! going, and `stop` aborts the task from outside.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Returned by a tick callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct Ticker {
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Start ticking every `period`, first tick one period from now.
    ///
    /// Returns `false` when a task was already running.
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&self, period: Duration, mut on_tick: F) -> bool
    where
        F: FnMut() -> TickFlow + Send + 'static,
    {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if on_tick() == TickFlow::Stop {
                    break;
                }
            }
        });
        *guard = Some(handle);
        true
    }

    pub fn stop(&self) {
        if let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn second_start_is_ignored() {
        let ticker = Ticker::new();
        let count = Arc::new(AtomicU32::new(0));

        let c = count.clone();
        assert!(ticker.start(Duration::from_secs(1), move || {
            c.fetch_add(1, Ordering::SeqCst);
            TickFlow::Continue
        }));
        let c = count.clone();
        assert!(!ticker.start(Duration::from_secs(1), move || {
            c.fetch_add(1, Ordering::SeqCst);
            TickFlow::Continue
        }));

        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);

        ticker.stop();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert!(!ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_stop_the_task() {
        let ticker = Ticker::new();
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        ticker.start(Duration::from_secs(1), move || {
            if c.fetch_add(1, Ordering::SeqCst) == 2 {
                TickFlow::Stop
            } else {
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_running());

        // A finished task no longer blocks a fresh start.
        assert!(ticker.start(Duration::from_secs(1), || TickFlow::Stop));
    }
}
