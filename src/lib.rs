//! # budget_autosave
//!
//! Debounced autosave of budget data to a user-chosen file, with handle
//! validation and an interactive reconnection flow for when the file link
//! expires.
//!
//! ## Overview
//!
//! Every data change is handed to [`AutosaveHandle::schedule`]. Once changes
//! have been quiet for the configured delay, the latest snapshot goes
//! through a [`SaveOrchestrator`]:
//!
//! 1. the [`ChangeDetector`] skips snapshots that equal the initial data or
//!    that a caller predicate vetoes;
//! 2. the current [`FileHandle`] is probed;
//! 3. if the probe fails, the user is asked through a [`Confirm`] prompt
//!    whether to reselect the file, and a [`FilePicker`] supplies the new
//!    handle;
//! 4. the snapshot is written and a [`SaveResult`] reported.
//!
//! Nothing is ever thrown past the orchestrator: failures come back as
//! `SaveResult { success: false, .. }` and as [`SaveStatus::Failed`] on the
//! status channel. A replacement handle is stored in the shared
//! [`FileSlot`].
//!
//! The [`budget`] module holds the document model and the variance, trend
//! and aggregation helpers; [`session`] holds the expiring access session.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use budget_autosave::budget::{BudgetDocument, LineItem};
//! use budget_autosave::{AutosaveBuilder, Confirm, FilePicker, FsHandle, Result};
//! use rust_decimal::Decimal;
//!
//! struct AlwaysReselect;
//! impl Confirm for AlwaysReselect {
//!     async fn confirm(&self, _message: &str) -> bool { true }
//! }
//!
//! struct Fallback;
//! impl FilePicker<FsHandle> for Fallback {
//!     async fn pick(&self) -> Result<Option<FsHandle>> {
//!         Ok(Some(FsHandle::new("/tmp/budget-recovered.json")))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let file = FsHandle::new("/tmp/budget.json");
//! let loaded = BudgetDocument::from_bytes(&file.read().await?)?;
//!
//! let autosave = AutosaveBuilder::new(AlwaysReselect, Fallback)
//!     .file_handle(file)
//!     .baseline(loaded.clone())
//!     .build();
//!
//! let mut edited = loaded;
//! edited.items.push(LineItem::new("Food", "Groceries", Decimal::from(450), Decimal::ZERO));
//! autosave.schedule(edited);
//!
//! // Before closing, save immediately:
//! let result = autosave.force_save().await;
//! println!("{}", result.message);
//! autosave.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod change;
pub mod config;
pub mod debounce;
pub mod error;
pub mod handle;
pub mod orchestrator;
pub mod reconnect;
pub mod saveable;
pub mod session;
pub mod storage;
pub mod validator;
mod worker;

pub use change::{ChangeDetector, Gate, SkipFn, SkipReason};
pub use config::{AutosaveBuilder, DEFAULT_DELAY};
pub use debounce::Debouncer;
pub use error::{AutosaveError, Result};
pub use handle::{AutosaveHandle, SaveStatus};
pub use orchestrator::{SaveOrchestrator, SaveOutcome, SaveResult};
pub use reconnect::{
    AbortReason, Confirm, DEFAULT_RECONNECT_MESSAGE, FilePicker, ReconnectState, Reconnector,
};
pub use saveable::{Json, Saveable};
pub use storage::{FileHandle, FileSlot, FsHandle};
pub use validator::{Validation, validate};
