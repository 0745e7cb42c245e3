//! File handles: opaque capabilities referencing a writable file.
//!
//! The crate ships with one built-in handle:
//!
//! - [`FsHandle`] -- a path on the local filesystem.
//!
//! Implement the [`FileHandle`] trait to back saves with something else
//! (a sandboxed document provider, an in-memory buffer for tests, ...).
//!
//! A handle may become unusable at any time: the file can be moved or
//! deleted, or write permission can lapse. The autosave never trusts a handle
//! without first calling [`FileHandle::probe`].

mod fs;

pub use fs::FsHandle;

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

/// Trait for handles that reference a writable file resource.
///
/// Handles are cheap to clone; a clone refers to the same resource.
///
/// # Implementing a custom handle
///
/// ```rust,no_run
/// use budget_autosave::{FileHandle, Result};
///
/// #[derive(Clone)]
/// struct Scratch;
///
/// impl FileHandle for Scratch {
///     async fn probe(&self) -> Result<()> {
///         Ok(())
///     }
///
///     async fn write(&self, content: &[u8]) -> Result<()> {
///         // write content somewhere ...
///         Ok(())
///     }
///
///     fn name(&self) -> String {
///         "scratch".into()
///     }
/// }
/// ```
pub trait FileHandle: Clone + Send + Sync + 'static {
    /// Attempt a real read/stat against the resource. `Ok` proves the handle
    /// is currently usable for writing.
    fn probe(&self) -> impl Future<Output = Result<()>> + Send;

    /// Replace the file contents with `content`.
    fn write(&self, content: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Human-readable name of the referenced file, used in messages.
    fn name(&self) -> String;
}

/// Shared cell holding the application's current file handle.
///
/// The application keeps a clone and reads the handle from it; the autosave
/// writes a replacement into it after a successful reconnection.
pub struct FileSlot<H> {
    inner: Arc<RwLock<Option<H>>>,
}

impl<H: FileHandle> FileSlot<H> {
    /// Create a slot, optionally holding an initial handle.
    pub fn new(handle: Option<H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(handle)),
        }
    }

    /// A clone of the current handle, if any.
    pub fn get(&self) -> Option<H> {
        self.inner.read().clone()
    }

    /// Store `handle`, returning the previous one.
    pub fn replace(&self, handle: H) -> Option<H> {
        self.inner.write().replace(handle)
    }

    /// Remove the stored handle.
    pub fn clear(&self) -> Option<H> {
        self.inner.write().take()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl<H> Clone for FileSlot<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: FileHandle> Default for FileSlot<H> {
    fn default() -> Self {
        Self::new(None)
    }
}
