//! The autosave handle: schedule, flush and observe saves.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::change::SkipReason;
use crate::debounce::Debouncer;
use crate::orchestrator::{SaveOutcome, SaveResult};
use crate::reconnect::{Confirm, FilePicker};
use crate::saveable::Saveable;
use crate::storage::{FileHandle, FileSlot};
use crate::worker::{self, Shared};

/// Save state published to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    /// A debounced save is armed.
    Pending,
    Saving,
    Saved(String),
    Skipped(String),
    Failed(String),
}

impl SaveStatus {
    pub(crate) fn from_result<H>(result: &SaveResult<H>) -> Self {
        match result.outcome {
            SaveOutcome::Written => SaveStatus::Saved(result.message.clone()),
            SaveOutcome::Skipped(_) => SaveStatus::Skipped(result.message.clone()),
            SaveOutcome::Aborted | SaveOutcome::Failed => SaveStatus::Failed(result.message.clone()),
        }
    }
}

/// Handle returned by [`AutosaveBuilder::build`](crate::AutosaveBuilder::build).
///
/// Feed every data change to [`schedule`](Self::schedule); the latest snapshot
/// is saved once changes have been quiet for the configured delay. Dropping
/// the handle cancels an armed save. A save that has already started runs to
/// completion.
pub struct AutosaveHandle<T, H, C, P> {
    shared: Arc<Shared<T, H, C, P>>,
    debouncer: Debouncer,
    delay: Duration,
    status: watch::Receiver<SaveStatus>,
}

impl<T, H, C, P> AutosaveHandle<T, H, C, P>
where
    T: Saveable,
    H: FileHandle,
    C: Confirm,
    P: FilePicker<H>,
{
    pub(crate) fn new(shared: Shared<T, H, C, P>, delay: Duration) -> Self {
        let status = shared.status.subscribe();
        Self {
            shared: Arc::new(shared),
            debouncer: Debouncer::new(),
            delay,
            status,
        }
    }

    /// Arm a save of `payload` after the debounce delay, replacing any save
    /// that has not fired yet.
    ///
    /// The first payload ever seen becomes the baseline unless one was set
    /// on the builder. Must be called within a Tokio runtime.
    pub fn schedule(&self, payload: T) {
        if self.shared.orchestrator.detector().observe(&payload) {
            tracing::debug!("Captured baseline snapshot");
        }
        *self.shared.latest.lock() = Some(payload.clone());

        let shared = Arc::clone(&self.shared);
        let debouncer = self.debouncer.clone();
        self.debouncer.schedule(self.delay, async move {
            worker::run_save(&shared, &debouncer, payload).await;
        });
        // A timer that already fired has published `Saving`; leave it.
        self.shared.status.send_if_modified(|status| {
            let armed = self.debouncer.is_pending();
            if armed {
                *status = SaveStatus::Pending;
            }
            armed
        });
        tracing::trace!("Save scheduled in {:?}", self.delay);
    }

    /// Disarm the pending save, if any. Returns `true` if one was armed.
    pub fn cancel(&self) -> bool {
        let cancelled = self.debouncer.cancel();
        if cancelled {
            self.shared.status.send_if_modified(|status| {
                let pending = *status == SaveStatus::Pending;
                if pending {
                    *status = SaveStatus::Idle;
                }
                pending
            });
        }
        cancelled
    }

    /// Save the latest snapshot now, bypassing the delay.
    ///
    /// Cancels an armed save. If another save is already running, waits for
    /// it to finish first rather than interrupting it.
    pub async fn force_save(&self) -> SaveResult<H> {
        self.debouncer.cancel();
        let payload = self.shared.latest.lock().clone();
        match payload {
            Some(payload) => worker::run_save(&self.shared, &self.debouncer, payload).await,
            None => SaveResult::skipped(SkipReason::NothingScheduled),
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Subscribe to save status updates.
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// The slot holding the current file handle. Replacement handles picked
    /// during reconnection are written into it.
    pub fn file_slot(&self) -> FileSlot<H> {
        self.shared.slot.clone()
    }

    /// Cancel any armed save and wait for a running one to finish.
    pub async fn shutdown(self) {
        self.debouncer.cancel();
        let _ = self.shared.in_flight.lock().await;
        tracing::debug!("Autosave shut down");
    }
}

impl<T, H, C, P> Drop for AutosaveHandle<T, H, C, P> {
    fn drop(&mut self) {
        self.debouncer.cancel();
    }
}
