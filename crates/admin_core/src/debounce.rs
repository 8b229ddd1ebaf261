use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

/// Turns a stream of keystrokes into a single value once input has been quiet
/// for `delay`.
///
/// At most one timer is pending at a time. Each [`push`](Self::push) cancels
/// the pending timer and starts a new one; only a timer that is still the
/// latest when it fires publishes its value. Dropping the debouncer cancels
/// any pending timer.
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                generation: Arc::new(AtomicU64::new(0)),
                pending: None,
                tx,
            },
            rx,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, raw: impl Into<String>) {
        let value = raw.into();
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let generation = self.generation.clone();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                return;
            }
            debug!(query = %value, "search input settled");
            let _ = tx.send(value);
        }));
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
