//! Per-batch state machine and the snapshot published to the host view.

use serde::{Deserialize, Serialize};

use docbatch_core::ValidationError;

use crate::progress::ProgressState;
use crate::toast::ToastMessage;

/// Lifecycle of one bulk operation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationState {
    /// No run in progress.
    #[default]
    Idle,
    /// Preconditions are being checked.
    Validating,
    /// The optimistic effect has been applied to the view.
    Optimistic,
    /// Waiting for the server and merging its answer.
    Reconciling,
    /// The server answered; partial failures have been reported.
    Settled,
    /// The call rejected as a whole; the view was forced to re-derive.
    RolledBack,
}

impl OperationState {
    /// Check if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: OperationState) -> bool {
        use OperationState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Idle)
                | (Validating, Optimistic)
                | (Optimistic, Reconciling)
                | (Reconciling, Settled)
                | (Reconciling, RolledBack)
                | (Settled, Idle)
                | (RolledBack, Idle)
        )
    }

    /// Check if a run is underway and triggering controls should be disabled.
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Check if this is a terminal state of a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::RolledBack)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Validating => write!(f, "Validating"),
            Self::Optimistic => write!(f, "Optimistic"),
            Self::Reconciling => write!(f, "Reconciling"),
            Self::Settled => write!(f, "Settled"),
            Self::RolledBack => write!(f, "Rolled back"),
        }
    }
}

/// Everything the host view reads from the coordinator.
///
/// Published through a `tokio::sync::watch` channel; the view never mutates it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorSnapshot {
    /// State of the most recent run.
    pub state: OperationState,
    /// Monotonic counter bumped whenever dependent views must drop their
    /// selection and re-derive from their data source.
    pub reset_selection_signal: u64,
    /// The message currently shown, if any.
    pub toast: Option<ToastMessage>,
    /// Progress of a large batch, if one is being dispatched.
    pub progress: Option<ProgressState>,
    /// Inline validation message for the last rejected request.
    pub validation: Option<ValidationError>,
}
