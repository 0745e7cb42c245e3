//! The save orchestrator: one complete save attempt, from gate to write.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::change::{ChangeDetector, Gate, SkipReason};
use crate::error::{AutosaveError, Result, panic_message};
use crate::reconnect::{AbortReason, Confirm, FilePicker, Reconnector};
use crate::saveable::Saveable;
use crate::storage::FileHandle;
use crate::validator;

/// How a save attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The payload was written.
    Written,
    /// The attempt was gated off before touching the file.
    Skipped(SkipReason),
    /// The handle was invalid and reconnection did not complete.
    Aborted,
    /// Encoding or writing failed.
    Failed,
}

/// Structured result of one save attempt.
///
/// `new_file_handle` is set only when the original handle failed its probe,
/// the user picked a replacement during this attempt, and the write through
/// the replacement succeeded. The caller must store it.
#[derive(Debug, Clone)]
pub struct SaveResult<H> {
    pub success: bool,
    pub message: String,
    pub new_file_handle: Option<H>,
    pub outcome: SaveOutcome,
}

impl<H> SaveResult<H> {
    pub(crate) fn skipped(reason: SkipReason) -> Self {
        let message = match reason {
            SkipReason::Vetoed => "Save skipped",
            SkipReason::Unchanged => "No changes to save",
            SkipReason::NothingScheduled => "Nothing to save",
        };
        Self {
            success: true,
            message: message.into(),
            new_file_handle: None,
            outcome: SaveOutcome::Skipped(reason),
        }
    }

    fn failed(outcome: SaveOutcome, err: &AutosaveError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            new_file_handle: None,
            outcome,
        }
    }
}

/// Sequences the change gate, handle validation, reconnection and the write.
///
/// The orchestrator holds no per-attempt state; serialising attempts is the
/// caller's job (see [`AutosaveHandle`](crate::AutosaveHandle)).
pub struct SaveOrchestrator<T, C, P> {
    detector: ChangeDetector<T>,
    reconnector: Reconnector<C, P>,
}

impl<T, C, P> SaveOrchestrator<T, C, P>
where
    T: Saveable,
    C: Confirm,
{
    pub fn new(detector: ChangeDetector<T>, reconnector: Reconnector<C, P>) -> Self {
        Self {
            detector,
            reconnector,
        }
    }

    pub fn detector(&self) -> &ChangeDetector<T> {
        &self.detector
    }

    /// Run one save attempt. Never returns an error, and panics raised by the
    /// handle, the payload encoder or the reconnection capabilities are
    /// caught: every failure becomes a failed [`SaveResult`].
    pub async fn save<H>(&self, payload: &T, handle: Option<H>) -> SaveResult<H>
    where
        H: FileHandle,
        P: FilePicker<H>,
    {
        if let Gate::Skip(reason) = self.detector.should_save(payload) {
            tracing::debug!("Save skipped: {reason:?}");
            return SaveResult::skipped(reason);
        }

        let valid = match &handle {
            Some(h) => validator::validate(h).await.valid,
            None => {
                tracing::info!("No file connected");
                false
            }
        };

        let (target, replaced) = match handle {
            Some(h) if valid => (h, false),
            _ => match reconnect(&self.reconnector).await {
                Ok(new) => (new, true),
                Err(reason) => {
                    let err = AutosaveError::ReconnectAborted(reason);
                    tracing::warn!("Save aborted: {err}");
                    return SaveResult::failed(SaveOutcome::Aborted, &err);
                }
            },
        };

        match write(payload, &target).await {
            Ok(bytes) => {
                tracing::info!("Saved {bytes} bytes to {}", target.name());
                SaveResult {
                    success: true,
                    message: format!("Saved to {}", target.name()),
                    new_file_handle: replaced.then_some(target),
                    outcome: SaveOutcome::Written,
                }
            }
            Err(err) => {
                tracing::error!("Save to {} failed: {err}", target.name());
                SaveResult::failed(SaveOutcome::Failed, &err)
            }
        }
    }
}

async fn reconnect<C, P, H>(reconnector: &Reconnector<C, P>) -> std::result::Result<H, AbortReason>
where
    C: Confirm,
    P: FilePicker<H>,
    H: FileHandle,
{
    AssertUnwindSafe(reconnector.run::<H>())
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(AbortReason::PickerFailed(panic_message(panic))))
}

// Encoding runs inside the caught region too: a panicking `encode` or
// `write` fails this attempt only.
async fn write<T: Saveable, H: FileHandle>(payload: &T, handle: &H) -> Result<usize> {
    AssertUnwindSafe(async {
        let bytes = payload.encode()?;
        handle.write(&bytes).await?;
        Ok::<_, AutosaveError>(bytes.len())
    })
    .catch_unwind()
    .await
    .map_err(|panic| AutosaveError::WritePanicked(panic_message(panic)))?
}
