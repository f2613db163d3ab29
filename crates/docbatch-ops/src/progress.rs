//! Progress reporting for large batches.

use serde::{Deserialize, Serialize};

/// Documents dispatched so far out of the batch total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub current: usize,
    pub total: usize,
}

impl ProgressState {
    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Check if every document has been dispatched.
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

impl std::fmt::Display for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// Counter for one batch, surfaced only above the batching threshold.
///
/// Reporting only: it never cancels or throttles dispatch.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    threshold: usize,
    current: usize,
    total: usize,
}

impl ProgressTracker {
    /// Create a tracker that stays hidden for batches of `threshold` or fewer.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            current: 0,
            total: 0,
        }
    }

    /// Reset for a new batch of `total` documents.
    pub fn start(&mut self, total: usize) {
        self.current = 0;
        self.total = total;
    }

    /// Record that `current` of `total` documents have been dispatched.
    ///
    /// Never moves backwards and never exceeds `total`.
    pub fn advance(&mut self, current: usize, total: usize) {
        self.total = total;
        self.current = current.max(self.current).min(total);
    }

    /// Check if the UI should show this tracker.
    pub fn is_visible(&self) -> bool {
        self.total > self.threshold
    }

    /// Check if every document has been dispatched.
    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }

    /// The state to show, or `None` while below the threshold.
    pub fn state(&self) -> Option<ProgressState> {
        self.is_visible().then_some(ProgressState {
            current: self.current,
            total: self.total,
        })
    }
}
