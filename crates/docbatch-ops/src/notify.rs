//! Seams to the host view: message rendering and data-source refresh.

use docbatch_core::{BulkOperationKind, DocumentId};

use crate::progress::ProgressState;
use crate::toast::ToastMessage;

/// Renders the coordinator's messages.
///
/// Calls arrive in the order the coordinator produced them.
pub trait Notifier: Send + Sync {
    /// Show or replace the current toast.
    fn show_toast(&self, toast: &ToastMessage);

    /// Show, update or (with `None`) hide the progress indicator.
    fn show_progress(&self, progress: Option<ProgressState>);
}

/// Notifier that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn show_toast(&self, _toast: &ToastMessage) {}

    fn show_progress(&self, _progress: Option<ProgressState>) {}
}

/// Told when the server confirmed a batch, so the host can refetch.
///
/// Never called for a batch that rejected as a whole.
pub trait SettleListener: Send + Sync {
    fn on_settled(&self, kind: BulkOperationKind, affected_ids: &[DocumentId]);
}

impl<F> SettleListener for F
where
    F: Fn(BulkOperationKind, &[DocumentId]) + Send + Sync,
{
    fn on_settled(&self, kind: BulkOperationKind, affected_ids: &[DocumentId]) {
        self(kind, affected_ids)
    }
}
