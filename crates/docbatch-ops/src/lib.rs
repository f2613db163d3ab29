//! Bulk operation coordinator for docbatch.
//!
//! This crate runs bulk move, archive, delete and restore batches against a
//! remote document store through a [`NetworkClient`], keeps the host view's
//! state optimistic while the call is in flight, reconciles partial failures
//! and offers a single-shot undo for archives. The host view observes the
//! coordinator through a [`CoordinatorSnapshot`] watch channel and a
//! [`Notifier`].

mod client;
mod coordinator;
mod notify;
mod progress;
mod reconcile;
mod selection;
mod state;
mod toast;
mod undo;
mod validation;

pub use client::{
    ArchiveRequest, ArchiveResponse, BoxFuture, ClientResult, DeleteResponse, MoveRequest,
    MoveResponse, NOT_RESTORED_REASON, NetworkClient, RestoreResponse, UNKNOWN_FAILURE_REASON,
};
pub use coordinator::{BulkOperationCoordinator, BulkOutcome, UndoOutcome};
pub use notify::{NoopNotifier, Notifier, SettleListener};
pub use progress::{ProgressState, ProgressTracker};
pub use reconcile::{
    UNDO_FAILURE_MESSAGE, documents_noun, partial_failure_message, sanitize, success_message,
    transport_failure_message, undo_success_message,
};
pub use selection::{SelectionSet, SharedSelection};
pub use state::{CoordinatorSnapshot, OperationState};
pub use toast::{Severity, ToastMessage, UndoToken};
pub use undo::{PendingUndo, UndoEntry, UndoRegistry};
pub use validation::{move_confirm_enabled, validate};
