//! Single-slot cancellable scheduled task.
//!
//! Scheduling a task after a delay cancels whichever task was previously
//! armed, so at most one task is ever pending.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

struct Armed {
    id: u64,
    task: JoinHandle<()>,
}

struct Inner {
    slot: Mutex<Option<Armed>>,
    next_id: AtomicU64,
}

/// Coalesces bursts of work into one delayed task.
///
/// A task that fires takes itself out of the slot before it starts running,
/// so a later [`schedule`](Self::schedule) or [`cancel`](Self::cancel) never
/// interrupts work that has already begun.
///
/// Requires a Tokio runtime when scheduling.
#[derive(Clone)]
pub struct Debouncer {
    inner: Arc<Inner>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(None),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Run `task` after `delay`, replacing any task that has not fired yet.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let this = self.clone();

        let mut slot = self.inner.slot.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if this.disarm(id) {
                task.await;
            }
        });
        if let Some(previous) = slot.replace(Armed { id, task: handle }) {
            tracing::trace!("Replacing pending task {}", previous.id);
            previous.task.abort();
        }
    }

    /// Cancel the armed task. Returns `true` if one was armed.
    pub fn cancel(&self) -> bool {
        match self.inner.slot.lock().take() {
            Some(armed) => {
                armed.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.slot.lock().is_some()
    }

    // Clear the slot if it still belongs to `id`. A task that lost the race
    // against a newer schedule must not run.
    fn disarm(&self, id: u64) -> bool {
        let mut slot = self.inner.slot.lock();
        match slot.as_ref() {
            Some(armed) if armed.id == id => {
                slot.take();
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
