//! Revision window location
//!
//! A request asks for the changes in `(baseline, end]`. For each item the
//! locator picks the snapshot the diff walk starts from, using a binary
//! search over the item's ascending history.

use crate::errors::{FeedError, Result};
use crate::model::{Revision, Revisioned};

/// The `(baseline, end]` range a request asks to be diffed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionWindow {
    baseline: Revision,
    end: Revision,
}

impl RevisionWindow {
    /// Build a window, rejecting `baseline >= end`
    ///
    /// # Errors
    ///
    /// Returns `FeedError::InvalidRevisionRange` when the range is empty or inverted.
    pub fn new(baseline: Revision, end: Revision) -> Result<Self> {
        if baseline >= end {
            return Err(FeedError::InvalidRevisionRange {
                reason: format!(
                    "lastUpdate ({}) must be lower than endRevision ({})",
                    baseline, end
                ),
            });
        }
        Ok(Self { baseline, end })
    }

    pub fn baseline(&self) -> Revision {
        self.baseline
    }

    pub fn end(&self) -> Revision {
        self.end
    }

    /// True for `baseline < revision <= end`
    pub fn contains(&self, revision: Revision) -> bool {
        revision > self.baseline && revision <= self.end
    }
}

/// Index of the snapshot to start diffing from, or `None` when the window
/// does not intersect the history
///
/// Rules, in order:
/// 1. `baseline == 0` starts at the first snapshot.
/// 2. A last snapshot exactly at `baseline` starts (and ends) there.
/// 3. Histories entirely before `baseline`, or entirely after `end`, are empty.
/// 4. Otherwise binary search: an exact hit starts at the hit; a miss starts
///    at the last snapshot before `baseline`, or at 0 when there is none.
///    A miss whose next snapshot already lies beyond `end` is empty.
pub fn locate_start<T: Revisioned>(history: &[T], window: &RevisionWindow) -> Option<usize> {
    let baseline = window.baseline();
    let end = window.end();

    let (first, last) = match (history.first(), history.last()) {
        (Some(first), Some(last)) => (first.revision(), last.revision()),
        _ => return None,
    };

    if baseline == Revision::ZERO {
        return Some(0);
    }
    if last == baseline {
        return Some(history.len() - 1);
    }
    if last < baseline || first > end {
        return None;
    }

    match history.binary_search_by(|snapshot| snapshot.revision().cmp(&baseline)) {
        Ok(hit) => Some(hit),
        Err(insertion) => {
            // `insertion` is the smallest index with revision > baseline; it
            // exists because last > baseline here.
            if history[insertion].revision() > end {
                return None;
            }
            Some(insertion.saturating_sub(1))
        }
    }
}
