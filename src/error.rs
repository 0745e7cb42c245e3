//! Error types for the `budget_autosave` crate.

use crate::reconnect::AbortReason;

/// All errors that can occur while saving, probing or reconnecting.
#[derive(Debug, thiserror::Error)]
pub enum AutosaveError {
    /// The write through a file handle failed.
    #[error("Write failed: {0}")]
    Write(Box<dyn std::error::Error + Send + Sync>),

    /// Encoding or writing the payload panicked.
    #[error("Write panicked: {0}")]
    WritePanicked(String),

    /// The read probe against a file handle failed.
    #[error("File is not accessible: {0}")]
    Probe(Box<dyn std::error::Error + Send + Sync>),

    /// The payload could not be encoded to bytes.
    #[error("Could not encode data: {0}")]
    Encode(String),

    /// Stored bytes could not be decoded.
    #[error("Could not decode data: {0}")]
    Decode(String),

    /// The user did not complete reconnection.
    #[error("{0}")]
    ReconnectAborted(AbortReason),

    /// The file picker reported an error.
    #[error("File picker failed: {0}")]
    Picker(String),

    /// Reading or writing the persisted session failed.
    #[error("Session error: {0}")]
    Session(String),

    /// The configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// A type alias for `Result<T, AutosaveError>`.
pub type Result<T> = std::result::Result<T, AutosaveError>;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_handles_common_payloads() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42_u8)), "unknown panic");
    }
}
