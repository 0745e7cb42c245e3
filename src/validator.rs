//! Handle validation by probing.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::panic_message;
use crate::storage::FileHandle;

/// Result of probing a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Probe error message when invalid.
    pub reason: Option<String>,
}

/// Confirm that `handle` is still usable for writing.
///
/// There is no way to check a handle's capability in advance, so this runs a
/// single real probe through it. Any failure makes the handle invalid for the
/// rest of the current save attempt, and so does a probe that panics. There
/// are no retries.
pub async fn validate<H: FileHandle>(handle: &H) -> Validation {
    let reason = match AssertUnwindSafe(handle.probe()).catch_unwind().await {
        Ok(Ok(())) => {
            return Validation {
                valid: true,
                reason: None,
            };
        }
        Ok(Err(e)) => e.to_string(),
        Err(panic) => format!("Probe panicked: {}", panic_message(panic)),
    };
    tracing::warn!("File handle {} failed probe: {reason}", handle.name());
    Validation {
        valid: false,
        reason: Some(reason),
    }
}
