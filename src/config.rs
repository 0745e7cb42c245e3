//! Builder for configuring an autosave instance.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::change::{ChangeDetector, SkipFn};
use crate::handle::{AutosaveHandle, SaveStatus};
use crate::orchestrator::SaveOrchestrator;
use crate::reconnect::{Confirm, DEFAULT_RECONNECT_MESSAGE, FilePicker, Reconnector};
use crate::saveable::Saveable;
use crate::storage::{FileHandle, FileSlot};
use crate::worker::Shared;

/// Default quiet period before a scheduled save fires.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Builder for configuring an [`AutosaveHandle`].
///
/// The confirmation prompt and file picker are host capabilities and must be
/// supplied up front; everything else has a default.
///
/// # Example
///
/// ```rust,no_run
/// use budget_autosave::{AutosaveBuilder, Confirm, FilePicker, FsHandle, Json, Result};
/// use std::time::Duration;
///
/// struct Yes;
/// impl Confirm for Yes {
///     async fn confirm(&self, _message: &str) -> bool { true }
/// }
///
/// struct Cancel;
/// impl FilePicker<FsHandle> for Cancel {
///     async fn pick(&self) -> Result<Option<FsHandle>> { Ok(None) }
/// }
///
/// # async fn example() {
/// let autosave = AutosaveBuilder::new(Yes, Cancel)
///     .delay(Duration::from_millis(500))
///     .file_handle(FsHandle::new("/tmp/budget.json"))
///     .skip_when(|data: &Json<Vec<i64>>| data.0.is_empty())
///     .build();
///
/// autosave.schedule(Json(vec![1200, 450]));
/// # }
/// ```
pub struct AutosaveBuilder<T, H, C, P> {
    confirm: C,
    picker: P,
    delay: Duration,
    message: String,
    skip: Option<SkipFn<T>>,
    baseline: Option<T>,
    slot: FileSlot<H>,
}

impl<T, H, C, P> AutosaveBuilder<T, H, C, P>
where
    T: Saveable,
    H: FileHandle,
    C: Confirm,
    P: FilePicker<H>,
{
    /// Create a builder with the given host capabilities.
    ///
    /// Defaults: 1 s delay, the standard reconnect prompt, no skip
    /// predicate, baseline captured from the first scheduled payload, no
    /// file connected.
    pub fn new(confirm: C, picker: P) -> Self {
        Self {
            confirm,
            picker,
            delay: DEFAULT_DELAY,
            message: DEFAULT_RECONNECT_MESSAGE.to_string(),
            skip: None,
            baseline: None,
            slot: FileSlot::default(),
        }
    }

    /// Quiet period after the last change before saving.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Message shown when asking the user to reselect an expired file.
    pub fn confirm_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Veto saves for which `skip` returns `true`.
    pub fn skip_when(mut self, skip: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.skip = Some(Arc::new(skip));
        self
    }

    /// Use `baseline` (typically the data just loaded from the file) as the
    /// unchanged state instead of the first scheduled payload.
    pub fn baseline(mut self, baseline: T) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Share the application's handle slot with the autosave.
    pub fn file_slot(mut self, slot: FileSlot<H>) -> Self {
        self.slot = slot;
        self
    }

    /// Start connected to `handle`.
    pub fn file_handle(mut self, handle: H) -> Self {
        self.slot = FileSlot::new(Some(handle));
        self
    }

    /// Consume the builder and return the [`AutosaveHandle`].
    pub fn build(self) -> AutosaveHandle<T, H, C, P> {
        let detector = match self.baseline {
            Some(baseline) => ChangeDetector::with_baseline(baseline, self.skip),
            None => ChangeDetector::new(self.skip),
        };
        let reconnector = Reconnector::with_message(self.confirm, self.picker, self.message);
        let (status, _) = watch::channel(SaveStatus::Idle);

        let shared = Shared {
            orchestrator: SaveOrchestrator::new(detector, reconnector),
            slot: self.slot,
            latest: Mutex::new(None),
            status,
            in_flight: tokio::sync::Mutex::new(()),
        };
        AutosaveHandle::new(shared, self.delay)
    }
}
