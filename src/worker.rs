//! The save path shared by debounced fires and forced saves.
//!
//! This module is internal -- users interact with it indirectly through
//! [`AutosaveHandle`](crate::AutosaveHandle).

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::debounce::Debouncer;
use crate::handle::SaveStatus;
use crate::orchestrator::{SaveOrchestrator, SaveResult};
use crate::reconnect::{Confirm, FilePicker};
use crate::saveable::Saveable;
use crate::storage::{FileHandle, FileSlot};

pub(crate) struct Shared<T, H, C, P> {
    pub orchestrator: SaveOrchestrator<T, C, P>,
    pub slot: FileSlot<H>,
    pub latest: Mutex<Option<T>>,
    pub status: watch::Sender<SaveStatus>,
    // Held for the whole attempt: one save in flight per instance.
    pub in_flight: tokio::sync::Mutex<()>,
}

/// Run one attempt under the in-flight lock and publish its status.
///
/// If another save was armed while this one ran, the status stays
/// [`SaveStatus::Pending`].
pub(crate) async fn run_save<T, H, C, P>(
    shared: &Shared<T, H, C, P>,
    debouncer: &Debouncer,
    payload: T,
) -> SaveResult<H>
where
    T: Saveable,
    H: FileHandle,
    C: Confirm,
    P: FilePicker<H>,
{
    let _guard = shared.in_flight.lock().await;
    shared.status.send_replace(SaveStatus::Saving);

    let result = shared.orchestrator.save(&payload, shared.slot.get()).await;

    if let Some(new_handle) = &result.new_file_handle {
        tracing::info!("Storing replacement file handle {}", new_handle.name());
        shared.slot.replace(new_handle.clone());
    }
    // Checked under the watch lock, the same lock `schedule` publishes
    // `Pending` under.
    shared.status.send_modify(|status| {
        *status = if debouncer.is_pending() {
            SaveStatus::Pending
        } else {
            SaveStatus::from_result(&result)
        };
    });
    result
}
