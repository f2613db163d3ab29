//! Preconditions checked before a batch touches any state.

use docbatch_core::{BulkOperationKind, BulkOperationRequest, DocumentRef, FolderId, ValidationError};

/// Check a request before dispatch.
///
/// Pure and synchronous. A `Move` is rejected only when every document is
/// already in the target; partial overlap goes to the server, which decides
/// per document.
pub fn validate(request: &BulkOperationRequest) -> Result<(), ValidationError> {
    if request.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    if request.kind == BulkOperationKind::Move {
        let target = request
            .params
            .target_folder()
            .ok_or(ValidationError::MissingTargetFolder)?;
        if all_in_folder(request.documents(), target) {
            return Err(ValidationError::SameFolder {
                target: target.clone(),
            });
        }
    }

    Ok(())
}

/// Whether the confirm control of the move dialog should be enabled.
pub fn move_confirm_enabled(documents: &[DocumentRef], target: &FolderId) -> bool {
    !documents.is_empty() && !all_in_folder(documents, target)
}

fn all_in_folder(documents: &[DocumentRef], target: &FolderId) -> bool {
    documents
        .iter()
        .all(|d| d.folder_id.as_ref() == Some(target))
}
