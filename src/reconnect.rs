//! Reconnection flow run when a file handle stops working.
//!
//! The flow is a small state machine driven by two host capabilities: a
//! blocking yes/no [`Confirm`] prompt and a [`FilePicker`]. Both are injected
//! so the flow can be exercised with scripted fakes.
//!
//! ```text
//! Prompting --decline--> Aborted(Declined)
//!     |
//!   accept
//!     v
//! Picking --cancel--> Aborted(PickerCancelled)
//!     |    --error--> Aborted(PickerFailed)
//!   file
//!     v
//! Reconnected(handle)
//! ```

use std::fmt;
use std::future::Future;

use crate::error::Result;
use crate::storage::FileHandle;

/// Message shown when asking the user to reselect an expired file.
pub const DEFAULT_RECONNECT_MESSAGE: &str =
    "Your file connection has expired. Would you like to reselect the file to continue saving?";

/// Blocking yes/no confirmation provided by the host environment.
pub trait Confirm: Send + Sync + 'static {
    /// Show `message` and wait, without timeout, for the user's answer.
    fn confirm(&self, message: &str) -> impl Future<Output = bool> + Send;
}

/// Native file selection provided by the host environment.
pub trait FilePicker<H: FileHandle>: Send + Sync + 'static {
    /// Let the user pick a file. `Ok(None)` means the user cancelled.
    fn pick(&self) -> impl Future<Output = Result<Option<H>>> + Send;
}

/// Why reconnection did not produce a new handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Declined,
    PickerCancelled,
    PickerFailed(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Declined => {
                f.write_str("File connection expired; reselect the file to resume saving")
            }
            AbortReason::PickerCancelled => {
                f.write_str("No file was selected; changes have not been saved")
            }
            AbortReason::PickerFailed(e) => write!(f, "Could not reselect the file: {e}"),
        }
    }
}

/// States of the reconnection flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectState<H> {
    Prompting,
    Picking,
    Aborted(AbortReason),
    Reconnected(H),
}

impl<H> ReconnectState<H> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconnectState::Aborted(_) | ReconnectState::Reconnected(_))
    }
}

/// Drives the reconnection state machine.
pub struct Reconnector<C, P> {
    confirm: C,
    picker: P,
    message: String,
}

impl<C: Confirm, P> Reconnector<C, P> {
    pub fn new(confirm: C, picker: P) -> Self {
        Self::with_message(confirm, picker, DEFAULT_RECONNECT_MESSAGE)
    }

    pub fn with_message(confirm: C, picker: P, message: impl Into<String>) -> Self {
        Self {
            confirm,
            picker,
            message: message.into(),
        }
    }

    /// Run the flow from `Prompting` until it reaches a terminal state.
    pub async fn run<H>(&self) -> std::result::Result<H, AbortReason>
    where
        H: FileHandle,
        P: FilePicker<H>,
    {
        let mut state = ReconnectState::Prompting;
        loop {
            state = match state {
                ReconnectState::Reconnected(handle) => return Ok(handle),
                ReconnectState::Aborted(reason) => return Err(reason),
                pending => self.step(pending).await,
            };
        }
    }

    /// Advance one transition. Terminal states are returned unchanged.
    pub async fn step<H>(&self, state: ReconnectState<H>) -> ReconnectState<H>
    where
        H: FileHandle,
        P: FilePicker<H>,
    {
        match state {
            ReconnectState::Prompting => {
                if self.confirm.confirm(&self.message).await {
                    tracing::debug!("Reconnection accepted, opening file picker");
                    ReconnectState::Picking
                } else {
                    tracing::info!("Reconnection declined");
                    ReconnectState::Aborted(AbortReason::Declined)
                }
            }
            ReconnectState::Picking => match self.picker.pick().await {
                Ok(Some(handle)) => {
                    tracing::info!("Reconnected to {}", handle.name());
                    ReconnectState::Reconnected(handle)
                }
                Ok(None) => {
                    tracing::info!("File picker cancelled");
                    ReconnectState::Aborted(AbortReason::PickerCancelled)
                }
                Err(e) => {
                    tracing::error!("File picker failed: {e}");
                    ReconnectState::Aborted(AbortReason::PickerFailed(e.to_string()))
                }
            },
            terminal => terminal,
        }
    }
}
