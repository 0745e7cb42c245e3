//! Change detection: decides whether a snapshot is worth saving at all.

use std::sync::{Arc, OnceLock};

/// Caller-supplied veto, e.g. "the form currently holds invalid input".
pub type SkipFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Why a save was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The skip predicate vetoed the save.
    Vetoed,
    /// The snapshot equals the baseline captured at startup.
    Unchanged,
    /// Nothing has been scheduled yet.
    NothingScheduled,
}

/// Outcome of the change gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Save,
    Skip(SkipReason),
}

/// Compares snapshots against a baseline and an optional skip predicate.
///
/// The baseline is the first snapshot the detector ever observes (or one set
/// explicitly before that). It is never updated afterwards, so saving, then
/// editing back to the loaded state, still counts as "unchanged".
pub struct ChangeDetector<T> {
    baseline: OnceLock<T>,
    skip: Option<SkipFn<T>>,
}

impl<T: PartialEq> ChangeDetector<T> {
    pub fn new(skip: Option<SkipFn<T>>) -> Self {
        Self {
            baseline: OnceLock::new(),
            skip,
        }
    }

    /// Create a detector whose baseline is already known.
    pub fn with_baseline(baseline: T, skip: Option<SkipFn<T>>) -> Self {
        let detector = Self::new(skip);
        let _ = detector.baseline.set(baseline);
        detector
    }

    /// Record `payload` as the baseline if none has been captured yet.
    ///
    /// Returns `true` if this call captured the baseline.
    pub fn observe(&self, payload: &T) -> bool
    where
        T: Clone,
    {
        let mut captured = false;
        self.baseline.get_or_init(|| {
            captured = true;
            payload.clone()
        });
        captured
    }

    pub fn baseline(&self) -> Option<&T> {
        self.baseline.get()
    }

    /// Evaluate both suppression rules. The predicate is consulted first.
    pub fn should_save(&self, payload: &T) -> Gate {
        if let Some(skip) = &self.skip {
            if skip(payload) {
                return Gate::Skip(SkipReason::Vetoed);
            }
        }
        if self.baseline.get() == Some(payload) {
            return Gate::Skip(SkipReason::Unchanged);
        }
        Gate::Save
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_becomes_baseline() {
        let detector = ChangeDetector::new(None);
        assert!(detector.observe(&vec![100, 200]));
        assert!(!detector.observe(&vec![150, 200]));
        assert_eq!(detector.baseline(), Some(&vec![100, 200]));
    }

    #[test]
    fn unchanged_payload_is_skipped() {
        let detector = ChangeDetector::new(None);
        detector.observe(&"rent=1200".to_string());

        assert_eq!(
            detector.should_save(&"rent=1200".to_string()),
            Gate::Skip(SkipReason::Unchanged)
        );
        assert_eq!(detector.should_save(&"rent=1250".to_string()), Gate::Save);
    }

    #[test]
    fn edit_back_to_baseline_is_skipped_again() {
        let detector = ChangeDetector::with_baseline(10, None);
        assert_eq!(detector.should_save(&11), Gate::Save);
        assert_eq!(detector.should_save(&10), Gate::Skip(SkipReason::Unchanged));
    }

    #[test]
    fn predicate_vetoes_before_baseline_check() {
        let skip: SkipFn<i64> = Arc::new(|amount| *amount < 0);
        let detector = ChangeDetector::with_baseline(-5, Some(skip));

        // Equal to baseline AND vetoed: the veto wins.
        assert_eq!(detector.should_save(&-5), Gate::Skip(SkipReason::Vetoed));
        assert_eq!(detector.should_save(&-1), Gate::Skip(SkipReason::Vetoed));
        assert_eq!(detector.should_save(&3), Gate::Save);
    }

    #[test]
    fn no_baseline_means_everything_saves() {
        let detector: ChangeDetector<u32> = ChangeDetector::new(None);
        assert_eq!(detector.should_save(&0), Gate::Save);
    }
}
