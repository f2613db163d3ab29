//! Runs one bulk operation end to end.
//!
//! Each run is a two-phase local commit. Phase one applies the optimistic
//! effect (selection cleared, success toast) before anything is sent. Phase
//! two reconciles the server's answer: partial failures are reported per
//! document and a rejected call forces the view to re-derive from its data
//! source. No error escapes [`BulkOperationCoordinator::execute`]; the host
//! only observes toasts, progress and the reset signal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use docbatch_core::{
    BulkOperationKind, BulkOperationRequest, BulkOperationResult, CoordinatorConfig, DealId,
    DocumentFailure, DocumentId, DocumentRef, FolderId, TransportError, ValidationError,
};

use crate::client::{ArchiveRequest, DeleteResponse, MoveRequest, NetworkClient};
use crate::notify::{NoopNotifier, Notifier, SettleListener};
use crate::progress::{ProgressState, ProgressTracker};
use crate::reconcile::{
    UNDO_FAILURE_MESSAGE, partial_failure_message, sanitize, success_message,
    transport_failure_message, undo_success_message,
};
use crate::selection::SharedSelection;
use crate::state::{CoordinatorSnapshot, OperationState};
use crate::toast::{ToastMessage, UndoToken};
use crate::undo::{PendingUndo, UndoRegistry};
use crate::validation::{move_confirm_enabled, validate};

/// How a call to [`BulkOperationCoordinator::execute`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// Nothing was selected; nothing happened.
    Ignored,
    /// A precondition failed before any state changed.
    Rejected(ValidationError),
    /// The server answered. Failures, if any, were reported per document.
    Settled(BulkOperationResult),
    /// The call rejected as a whole and the view was told to re-derive.
    RolledBack(TransportError),
}

impl BulkOutcome {
    /// The reconciled result, if the server answered.
    pub fn result(&self) -> Option<&BulkOperationResult> {
        match self {
            Self::Settled(result) => Some(result),
            _ => None,
        }
    }
}

/// How a call to [`BulkOperationCoordinator::undo`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// No live entry matched: already consumed, superseded or expired.
    Unavailable,
    /// The restore call answered.
    Restored(BulkOperationResult),
    /// The restore call rejected. The entry is not re-armed.
    Failed(TransportError),
}

/// Per-run state machine value, dropped when the run returns to idle.
#[derive(Debug)]
struct Run {
    id: u64,
    kind: BulkOperationKind,
    state: OperationState,
}

impl Run {
    fn advance(&mut self, next: OperationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(
            run = self.id,
            kind = %self.kind,
            from = %self.state,
            to = %next,
            "Bulk operation transition"
        );
        self.state = next;
    }
}

/// Orchestrates bulk move, archive, delete and restore for one deal.
pub struct BulkOperationCoordinator<C> {
    deal: DealId,
    client: C,
    config: CoordinatorConfig,
    selection: SharedSelection,
    undo: Mutex<UndoRegistry>,
    view: watch::Sender<CoordinatorSnapshot>,
    notifier: Arc<dyn Notifier>,
    listener: Option<Arc<dyn SettleListener>>,
    runs: AtomicU64,
}

impl<C: NetworkClient> BulkOperationCoordinator<C> {
    /// Create a coordinator for `deal` with default settings.
    pub fn new(deal: impl Into<DealId>, client: C) -> Self {
        let (view, _) = watch::channel(CoordinatorSnapshot::default());
        Self {
            deal: deal.into(),
            client,
            config: CoordinatorConfig::default(),
            selection: SharedSelection::new(),
            undo: Mutex::new(UndoRegistry::new()),
            view,
            notifier: Arc::new(NoopNotifier),
            listener: None,
            runs: AtomicU64::new(0),
        }
    }

    /// Use a custom configuration.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Share the host view's selection.
    pub fn with_selection(mut self, selection: SharedSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Render messages through `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Call `listener` whenever the server confirms a batch.
    pub fn with_settle_listener(mut self, listener: Arc<dyn SettleListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The deal this coordinator operates on.
    pub fn deal(&self) -> &DealId {
        &self.deal
    }

    /// The active configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The selection this coordinator clears.
    pub fn selection(&self) -> &SharedSelection {
        &self.selection
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorSnapshot> {
        self.view.subscribe()
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        self.view.borrow().clone()
    }

    /// Current value of the reset-selection counter.
    pub fn reset_selection_signal(&self) -> u64 {
        self.view.borrow().reset_selection_signal
    }

    /// The toast currently shown.
    pub fn toast(&self) -> Option<ToastMessage> {
        self.view.borrow().toast.clone()
    }

    /// The progress currently shown.
    pub fn progress(&self) -> Option<ProgressState> {
        self.view.borrow().progress
    }

    /// State of the most recent run.
    pub fn state(&self) -> OperationState {
        self.view.borrow().state
    }

    /// Whether the move dialog may be confirmed for `documents`.
    pub fn move_confirm_enabled(&self, documents: &[DocumentRef], target: &FolderId) -> bool {
        move_confirm_enabled(documents, target)
    }

    /// Move `documents` into `target`.
    pub async fn on_bulk_move(
        &self,
        documents: Vec<DocumentRef>,
        target: impl Into<FolderId>,
    ) -> BulkOutcome {
        self.execute(BulkOperationRequest::move_to(documents, target))
            .await
    }

    /// Archive `documents`, offering undo on success.
    pub async fn on_bulk_archive(&self, documents: Vec<DocumentRef>) -> BulkOutcome {
        self.execute(BulkOperationRequest::archive(documents)).await
    }

    /// Delete `documents`.
    pub async fn on_bulk_delete(&self, documents: Vec<DocumentRef>) -> BulkOutcome {
        self.execute(BulkOperationRequest::delete(documents)).await
    }

    /// Restore archived `documents`.
    pub async fn on_bulk_restore(&self, documents: Vec<DocumentRef>) -> BulkOutcome {
        self.execute(BulkOperationRequest::restore(documents)).await
    }

    /// Run `request` through the full state machine.
    ///
    /// Resolves once reconciliation is complete. Re-running a settled request
    /// is safe: the server decides what is left to do.
    pub async fn execute(&self, request: BulkOperationRequest) -> BulkOutcome {
        if request.is_empty() {
            tracing::debug!(kind = %request.kind, "Ignoring bulk operation with empty selection");
            return BulkOutcome::Ignored;
        }

        let mut run = Run {
            id: self.runs.fetch_add(1, Ordering::Relaxed) + 1,
            kind: request.kind,
            state: OperationState::Idle,
        };

        self.enter(&mut run, OperationState::Validating);
        if let Err(err) = validate(&request) {
            tracing::debug!(run = run.id, error = %err, "Bulk operation rejected");
            run.advance(OperationState::Idle);
            self.view.send_modify(|s| {
                s.state = OperationState::Idle;
                s.validation = Some(err.clone());
            });
            return BulkOutcome::Rejected(err);
        }

        let ids = request.document_ids();
        let pending = self.apply_optimistic(&mut run, &request, &ids);

        self.enter(&mut run, OperationState::Reconciling);
        match self.dispatch(&request, ids).await {
            Ok(result) => self.settle(run, &request, result, pending),
            Err(err) => self.roll_back(run, err),
        }
    }

    /// Restore the archive named by `token`.
    ///
    /// Single-shot: a consumed, superseded or expired entry makes this a
    /// no-op without any network call.
    pub async fn undo(&self, token: UndoToken) -> UndoOutcome {
        let entry = self.registry().consume_token(token);
        let Some(entry) = entry else {
            tracing::debug!(token = token.0, "No live undo entry");
            return UndoOutcome::Unavailable;
        };

        self.view.send_modify(|s| {
            if let Some(toast) = s.toast.as_mut().filter(|t| t.undo == Some(token)) {
                toast.undo = None;
            }
        });

        let ids = entry.committed_ids;
        match self.client.restore_documents(&self.deal, ids.clone()).await {
            Ok(response) => {
                let restored = BulkOperationRequest::restore(entry.original_documents);
                let result = sanitize(&restored, response.into_result(&ids));
                tracing::info!(
                    restored = result.succeeded_count(),
                    failed = result.failed_count(),
                    "Archive undone"
                );
                self.notify_settled(BulkOperationKind::Restore, &result.succeeded_ids);
                let text = if result.is_complete_success() {
                    undo_success_message(result.succeeded_count())
                } else {
                    partial_failure_message(&restored, &result)
                };
                self.show(ToastMessage::status(text));
                UndoOutcome::Restored(result)
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to undo archive");
                self.show(ToastMessage::alert(UNDO_FAILURE_MESSAGE));
                UndoOutcome::Failed(err)
            }
        }
    }

    /// Phase one: commit the optimistic effect before dispatch.
    fn apply_optimistic(
        &self,
        run: &mut Run,
        request: &BulkOperationRequest,
        ids: &[DocumentId],
    ) -> Option<PendingUndo> {
        self.selection.lock().clear();

        if let Some(token) = self.registry().invalidate_overlapping(ids) {
            tracing::debug!(token = token.0, "Undo entry superseded by newer bulk operation");
        }

        run.advance(OperationState::Optimistic);
        let toast = ToastMessage::status(success_message(request.kind, request.len()));
        self.notifier.show_toast(&toast);
        self.view.send_modify(|s| {
            s.state = OperationState::Optimistic;
            s.validation = None;
            s.reset_selection_signal += 1;
            s.toast = Some(toast);
        });

        PendingUndo::snapshot(request.kind, request.documents())
    }

    /// Send the batch, in sequential chunks above the threshold.
    ///
    /// Only a rejection before anything committed is an error. Once a chunk
    /// has been accepted, a later rejection stops dispatch and every id not
    /// yet confirmed is reported as failed with the transport error.
    async fn dispatch(
        &self,
        request: &BulkOperationRequest,
        ids: Vec<DocumentId>,
    ) -> Result<BulkOperationResult, TransportError> {
        let total = ids.len();
        if !self.config.is_batched(total) {
            return self.call(request, ids).await;
        }

        let mut tracker = ProgressTracker::new(self.config.batch_threshold);
        tracker.start(total);
        self.show_progress(tracker.state());

        let mut merged = BulkOperationResult::default();
        let mut dispatched = 0;
        for chunk in ids.chunks(self.config.chunk_size.max(1)) {
            let result = match self.call(request, chunk.to_vec()).await {
                Ok(result) => result,
                Err(err) if dispatched == 0 => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        kind = %request.kind,
                        dispatched,
                        total,
                        error = %err,
                        "Chunk rejected after partial commit"
                    );
                    let reason = err.to_string();
                    let undispatched = ids[dispatched..]
                        .iter()
                        .map(|id| DocumentFailure::new(id.clone(), reason.clone()))
                        .collect();
                    merged.merge(BulkOperationResult::new(Vec::new(), undispatched));
                    return Ok(merged);
                }
            };
            merged.merge(result);
            dispatched += chunk.len();
            tracker.advance(dispatched, total);
            self.show_progress(tracker.state());
        }

        debug_assert!(tracker.is_complete());
        Ok(merged)
    }

    /// One network call for `ids`.
    async fn call(
        &self,
        request: &BulkOperationRequest,
        ids: Vec<DocumentId>,
    ) -> Result<BulkOperationResult, TransportError> {
        match request.kind {
            BulkOperationKind::Move => {
                let target_folder_id = request.params.target_folder().cloned().ok_or_else(|| {
                    TransportError::Other {
                        message: "Move request without target folder".to_string(),
                    }
                })?;
                let request = MoveRequest {
                    document_ids: ids,
                    target_folder_id,
                };
                self.client
                    .move_documents(&self.deal, request)
                    .await
                    .map(Into::into)
            }
            BulkOperationKind::Archive => self
                .client
                .archive_documents(&self.deal, ArchiveRequest { document_ids: ids })
                .await
                .map(Into::into),
            BulkOperationKind::Restore => {
                let requested = ids.clone();
                self.client
                    .restore_documents(&self.deal, ids)
                    .await
                    .map(|response| response.into_result(&requested))
            }
            BulkOperationKind::Delete => self
                .client
                .delete_documents(&self.deal, ids)
                .await
                .map(DeleteResponse::into_result),
        }
    }

    /// Phase two, server answered.
    fn settle(
        &self,
        mut run: Run,
        request: &BulkOperationRequest,
        result: BulkOperationResult,
        pending: Option<PendingUndo>,
    ) -> BulkOutcome {
        let result = sanitize(request, result);
        run.advance(OperationState::Settled);

        self.notify_settled(request.kind, &result.succeeded_ids);

        let toast = if result.is_complete_success() {
            tracing::info!(
                run = run.id,
                kind = %request.kind,
                documents = request.len(),
                "Bulk operation settled"
            );
            let toast = ToastMessage::status(success_message(request.kind, request.len()));
            match pending {
                Some(pending) => {
                    let entry =
                        pending.confirm(result.succeeded_ids.clone(), self.config.undo_ttl());
                    let token = self.registry().register(entry);
                    toast.with_undo(token)
                }
                None => toast,
            }
        } else {
            tracing::warn!(
                run = run.id,
                kind = %request.kind,
                succeeded = result.succeeded_count(),
                failed = result.failed_count(),
                "Bulk operation partially failed"
            );
            ToastMessage::status(partial_failure_message(request, &result))
        };

        self.finish(run, OperationState::Settled, toast, false);
        BulkOutcome::Settled(result)
    }

    /// Phase two, call rejected: force the view to re-derive.
    fn roll_back(&self, mut run: Run, err: TransportError) -> BulkOutcome {
        run.advance(OperationState::RolledBack);
        tracing::error!(run = run.id, kind = %run.kind, error = %err, "Bulk operation failed");

        let toast = ToastMessage::alert(transport_failure_message(run.kind));
        self.finish(run, OperationState::RolledBack, toast, true);
        BulkOutcome::RolledBack(err)
    }

    /// Publish the terminal state and final toast, then drop back to idle.
    fn finish(&self, mut run: Run, terminal: OperationState, toast: ToastMessage, reset: bool) {
        let had_progress = self.view.borrow().progress.is_some();
        if had_progress {
            self.notifier.show_progress(None);
        }
        self.notifier.show_toast(&toast);
        self.view.send_modify(|s| {
            s.state = terminal;
            s.progress = None;
            s.toast = Some(toast);
            if reset {
                s.reset_selection_signal += 1;
            }
        });

        self.enter(&mut run, OperationState::Idle);
    }

    fn enter(&self, run: &mut Run, next: OperationState) {
        run.advance(next);
        self.view.send_modify(|s| s.state = next);
    }

    fn show(&self, toast: ToastMessage) {
        self.notifier.show_toast(&toast);
        self.view.send_modify(|s| s.toast = Some(toast));
    }

    fn show_progress(&self, progress: Option<ProgressState>) {
        self.notifier.show_progress(progress);
        self.view.send_modify(|s| s.progress = progress);
    }

    fn notify_settled(&self, kind: BulkOperationKind, affected: &[DocumentId]) {
        if let Some(listener) = &self.listener {
            listener.on_settled(kind, affected);
        }
    }

    fn registry(&self) -> MutexGuard<'_, UndoRegistry> {
        self.undo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
