//! The network contract the coordinator dispatches through.
//!
//! Request and response types mirror the REST payloads field for field so
//! transports can serialize them directly.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use docbatch_core::{
    BulkOperationResult, DealId, DocumentFailure, DocumentId, FolderId, TransportError,
};

/// Type alias for boxed futures returned by async client methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a single network call.
pub type ClientResult<T> = Result<T, TransportError>;

/// Body of a bulk move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub document_ids: Vec<DocumentId>,
    pub target_folder_id: FolderId,
}

/// Answer to a bulk move call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub moved_ids: Vec<DocumentId>,
    #[serde(default)]
    pub failures: Vec<DocumentFailure>,
}

/// Body of a bulk archive call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub document_ids: Vec<DocumentId>,
}

/// Answer to a bulk archive call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub archived_ids: Vec<DocumentId>,
    #[serde(default)]
    pub failures: Vec<DocumentFailure>,
}

/// Answer to a bulk restore call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub restored_ids: Vec<DocumentId>,
}

/// Answer to a bulk delete call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub deleted_count: usize,
    pub deleted_ids: Vec<DocumentId>,
    #[serde(default)]
    pub failed_ids: Vec<DocumentId>,
    #[serde(default)]
    pub failed_reasons: HashMap<DocumentId, String>,
}

/// Reason reported for a failed delete the server gave no reason for.
pub const UNKNOWN_FAILURE_REASON: &str = "Unknown error";

/// Reason reported for a document missing from a restore answer.
pub const NOT_RESTORED_REASON: &str = "Not restored";

impl From<MoveResponse> for BulkOperationResult {
    fn from(response: MoveResponse) -> Self {
        BulkOperationResult::new(response.moved_ids, response.failures)
    }
}

impl From<ArchiveResponse> for BulkOperationResult {
    fn from(response: ArchiveResponse) -> Self {
        BulkOperationResult::new(response.archived_ids, response.failures)
    }
}

impl DeleteResponse {
    /// Convert into a per-document result.
    pub fn into_result(mut self) -> BulkOperationResult {
        let failures = self
            .failed_ids
            .into_iter()
            .map(|id| {
                let reason = self
                    .failed_reasons
                    .remove(&id)
                    .unwrap_or_else(|| UNKNOWN_FAILURE_REASON.to_string());
                DocumentFailure { id, reason }
            })
            .collect();
        BulkOperationResult::new(self.deleted_ids, failures)
    }
}

impl RestoreResponse {
    /// Convert into a per-document result for the `requested` ids.
    ///
    /// The restore call reports no failures, so requested ids the server did
    /// not echo back are treated as failed.
    pub fn into_result(self, requested: &[DocumentId]) -> BulkOperationResult {
        let failures = requested
            .iter()
            .filter(|id| !self.restored_ids.contains(id))
            .map(|id| DocumentFailure::new(id.clone(), NOT_RESTORED_REASON))
            .collect();
        BulkOperationResult::new(self.restored_ids, failures)
    }
}

/// Performs the bulk calls against the remote document store.
///
/// Each call is atomic per document on the server but not across the batch.
/// A returned `Err` means the call rejected as a whole.
pub trait NetworkClient: Send + Sync {
    /// Move documents into a folder.
    fn move_documents<'a>(
        &'a self,
        deal: &'a DealId,
        request: MoveRequest,
    ) -> BoxFuture<'a, ClientResult<MoveResponse>>;

    /// Archive documents.
    fn archive_documents<'a>(
        &'a self,
        deal: &'a DealId,
        request: ArchiveRequest,
    ) -> BoxFuture<'a, ClientResult<ArchiveResponse>>;

    /// Restore archived documents.
    fn restore_documents<'a>(
        &'a self,
        deal: &'a DealId,
        document_ids: Vec<DocumentId>,
    ) -> BoxFuture<'a, ClientResult<RestoreResponse>>;

    /// Delete documents.
    fn delete_documents<'a>(
        &'a self,
        deal: &'a DealId,
        document_ids: Vec<DocumentId>,
    ) -> BoxFuture<'a, ClientResult<DeleteResponse>>;
}

impl<T: NetworkClient + ?Sized> NetworkClient for std::sync::Arc<T> {
    fn move_documents<'a>(
        &'a self,
        deal: &'a DealId,
        request: MoveRequest,
    ) -> BoxFuture<'a, ClientResult<MoveResponse>> {
        (**self).move_documents(deal, request)
    }

    fn archive_documents<'a>(
        &'a self,
        deal: &'a DealId,
        request: ArchiveRequest,
    ) -> BoxFuture<'a, ClientResult<ArchiveResponse>> {
        (**self).archive_documents(deal, request)
    }

    fn restore_documents<'a>(
        &'a self,
        deal: &'a DealId,
        document_ids: Vec<DocumentId>,
    ) -> BoxFuture<'a, ClientResult<RestoreResponse>> {
        (**self).restore_documents(deal, document_ids)
    }

    fn delete_documents<'a>(
        &'a self,
        deal: &'a DealId,
        document_ids: Vec<DocumentId>,
    ) -> BoxFuture<'a, ClientResult<DeleteResponse>> {
        (**self).delete_documents(deal, document_ids)
    }
}
