//! Merging the server's answer with the request and phrasing the outcome.

use std::collections::HashSet;

use itertools::Itertools;

use docbatch_core::{
    BulkOperationKind, BulkOperationRequest, BulkOperationResult, DocumentFailure, DocumentId,
};

/// Alert shown when the compensating restore of an archive fails.
pub const UNDO_FAILURE_MESSAGE: &str = "Failed to undo archive";

/// Bring a server result in line with the request it answers.
///
/// Ids that were never requested are dropped, repeated ids collapse, and an
/// id reported both as succeeded and failed counts as failed.
pub fn sanitize(request: &BulkOperationRequest, result: BulkOperationResult) -> BulkOperationResult {
    let requested: HashSet<&DocumentId> = request.documents().iter().map(|d| &d.id).collect();

    let mut failed = HashSet::new();
    let failures: Vec<DocumentFailure> = result
        .failures
        .into_iter()
        .filter(|f| {
            if !requested.contains(&f.id) {
                tracing::warn!(id = %f.id, "Server reported failure for unrequested document");
                return false;
            }
            failed.insert(f.id.clone())
        })
        .collect();

    let mut seen = HashSet::new();
    let succeeded_ids = result
        .succeeded_ids
        .into_iter()
        .filter(|id| {
            if !requested.contains(id) {
                tracing::warn!(%id, "Server reported success for unrequested document");
                return false;
            }
            if failed.contains(id) {
                tracing::warn!(%id, "Server reported document as both succeeded and failed");
                return false;
            }
            seen.insert(id.clone())
        })
        .collect();

    BulkOperationResult::new(succeeded_ids, failures)
}

/// "document" or "documents".
pub fn documents_noun(count: usize) -> &'static str {
    if count == 1 { "document" } else { "documents" }
}

/// Optimistic and confirmed success text, e.g. "Moved 2 documents".
pub fn success_message(kind: BulkOperationKind, count: usize) -> String {
    format!("{} {} {}", kind.past_tense(), count, documents_noun(count))
}

/// Partial failure text, e.g.
/// "Moved 1 of 2 documents. report.pdf: Permission denied".
///
/// Names come from the request; the server only knows ids.
pub fn partial_failure_message(
    request: &BulkOperationRequest,
    result: &BulkOperationResult,
) -> String {
    let total = request.len();
    let details = result
        .failures
        .iter()
        .map(|f| {
            let name = request
                .document(&f.id)
                .map(|d| d.name.as_str())
                .unwrap_or_else(|| f.id.as_str());
            format!("{}: {}", name, f.reason)
        })
        .join("; ");

    format!(
        "{} {} of {} {}. {}",
        request.kind.past_tense(),
        result.succeeded_count(),
        total,
        documents_noun(total),
        details
    )
}

/// Alert text when the whole call rejected, e.g. "Failed to move documents".
pub fn transport_failure_message(kind: BulkOperationKind) -> String {
    format!("Failed to {} documents", kind.verb())
}

/// Text after a successful undo, e.g. "Unarchived 1 document".
pub fn undo_success_message(count: usize) -> String {
    format!("Unarchived {} {}", count, documents_noun(count))
}
