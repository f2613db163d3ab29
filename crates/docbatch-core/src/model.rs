//! Document references, bulk requests and their results.

use std::collections::HashSet;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub CompactString);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(CompactString::new(id.as_ref()))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(CompactString::from(id))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

string_id!(
    /// Server-side identifier of a document.
    DocumentId
);

string_id!(
    /// Server-side identifier of a folder.
    FolderId
);

string_id!(
    /// Identifier of the deal (workspace) that owns the documents.
    DealId
);

/// Snapshot of a document taken when it was selected.
///
/// Identity is the `id`; `name` and `folder_id` are only used for messages
/// and validation and may be stale by the time the server sees the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
}

impl DocumentRef {
    /// Create a document reference.
    pub fn new(
        id: impl Into<DocumentId>,
        name: impl Into<String>,
        folder_id: Option<FolderId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder_id,
        }
    }

    /// Create a reference for a document that lives in `folder`.
    pub fn in_folder(
        id: impl Into<DocumentId>,
        name: impl Into<String>,
        folder: impl Into<FolderId>,
    ) -> Self {
        Self::new(id, name, Some(folder.into()))
    }
}

/// The structural operation applied to every document in a batch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BulkOperationKind {
    Move,
    Archive,
    Delete,
    Restore,
}

impl BulkOperationKind {
    /// Past tense used in success messages ("Moved").
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Move => "Moved",
            Self::Archive => "Archived",
            Self::Delete => "Deleted",
            Self::Restore => "Restored",
        }
    }

    /// Imperative verb used in failure messages ("move").
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Archive => "archive",
            Self::Delete => "delete",
            Self::Restore => "restore",
        }
    }

    /// Whether a compensating action exists for this kind.
    pub fn is_reversible(&self) -> bool {
        matches!(self, Self::Archive)
    }
}

/// Kind-specific request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BulkParams {
    /// Destination of a move.
    Move { target_folder_id: FolderId },
    #[default]
    None,
}

impl BulkParams {
    /// The move destination, if any.
    pub fn target_folder(&self) -> Option<&FolderId> {
        match self {
            Self::Move { target_folder_id } => Some(target_folder_id),
            Self::None => None,
        }
    }
}

/// One bulk operation as requested by the host view.
///
/// Documents are de-duplicated by id on construction, keeping the first
/// occurrence, so a request never carries the same id twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOperationRequest {
    pub kind: BulkOperationKind,
    documents: Vec<DocumentRef>,
    pub params: BulkParams,
}

impl BulkOperationRequest {
    /// Create a request for an arbitrary kind.
    pub fn new(kind: BulkOperationKind, documents: Vec<DocumentRef>, params: BulkParams) -> Self {
        Self {
            kind,
            documents: dedup_documents(documents),
            params,
        }
    }

    /// Create a move request.
    pub fn move_to(documents: Vec<DocumentRef>, target_folder_id: impl Into<FolderId>) -> Self {
        Self::new(
            BulkOperationKind::Move,
            documents,
            BulkParams::Move {
                target_folder_id: target_folder_id.into(),
            },
        )
    }

    /// Create an archive request.
    pub fn archive(documents: Vec<DocumentRef>) -> Self {
        Self::new(BulkOperationKind::Archive, documents, BulkParams::None)
    }

    /// Create a delete request.
    pub fn delete(documents: Vec<DocumentRef>) -> Self {
        Self::new(BulkOperationKind::Delete, documents, BulkParams::None)
    }

    /// Create a restore request.
    pub fn restore(documents: Vec<DocumentRef>) -> Self {
        Self::new(BulkOperationKind::Restore, documents, BulkParams::None)
    }

    /// The documents in selection order.
    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    /// The document ids in selection order.
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|d| d.id.clone()).collect()
    }

    /// Number of documents in the request.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the request has no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a requested document by id.
    pub fn document(&self, id: &DocumentId) -> Option<&DocumentRef> {
        self.documents.iter().find(|d| &d.id == id)
    }
}

fn dedup_documents(documents: Vec<DocumentRef>) -> Vec<DocumentRef> {
    let mut seen = HashSet::with_capacity(documents.len());
    documents
        .into_iter()
        .filter(|d| seen.insert(d.id.clone()))
        .collect()
}

/// A document the server refused to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub id: DocumentId,
    pub reason: String,
}

impl DocumentFailure {
    /// Create a new failure entry.
    pub fn new(id: impl Into<DocumentId>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.reason)
    }
}

/// Per-document outcome of a bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperationResult {
    pub succeeded_ids: Vec<DocumentId>,
    pub failures: Vec<DocumentFailure>,
}

impl BulkOperationResult {
    /// Create a result from its parts.
    pub fn new(succeeded_ids: Vec<DocumentId>, failures: Vec<DocumentFailure>) -> Self {
        Self {
            succeeded_ids,
            failures,
        }
    }

    /// Append the outcome of another chunk.
    pub fn merge(&mut self, other: BulkOperationResult) {
        self.succeeded_ids.extend(other.succeeded_ids);
        self.failures.extend(other.failures);
    }

    /// Check if no document failed.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of documents that succeeded.
    pub fn succeeded_count(&self) -> usize {
        self.succeeded_ids.len()
    }

    /// Number of documents that failed.
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_dedups_by_id() {
        let request = BulkOperationRequest::archive(vec![
            DocumentRef::new("doc-1", "a.pdf", None),
            DocumentRef::new("doc-2", "b.pdf", None),
            DocumentRef::new("doc-1", "a (copy).pdf", None),
        ]);

        assert_eq!(request.len(), 2);
        assert_eq!(request.documents()[0].name, "a.pdf");
        assert_eq!(
            request.document_ids(),
            vec![DocumentId::new("doc-1"), DocumentId::new("doc-2")]
        );
    }

    #[test]
    fn test_kind_wording() {
        assert_eq!(BulkOperationKind::Move.past_tense(), "Moved");
        assert_eq!(BulkOperationKind::Delete.verb(), "delete");
        assert!(BulkOperationKind::Archive.is_reversible());
        assert!(!BulkOperationKind::Delete.is_reversible());
        assert_eq!(BulkOperationKind::Restore.to_string(), "restore");
        assert_eq!(
            "archive".parse::<BulkOperationKind>().unwrap(),
            BulkOperationKind::Archive
        );
    }

    #[test]
    fn test_move_params_target() {
        let request =
            BulkOperationRequest::move_to(vec![DocumentRef::new("doc-1", "a.pdf", None)], "f-2");
        assert_eq!(request.params.target_folder(), Some(&FolderId::new("f-2")));
        assert_eq!(BulkParams::None.target_folder(), None);
    }

    #[test]
    fn test_result_merge() {
        let mut result = BulkOperationResult::new(vec!["doc-1".into()], Vec::new());
        result.merge(BulkOperationResult::new(
            vec!["doc-2".into()],
            vec![DocumentFailure::new("doc-3", "Locked")],
        ));

        assert_eq!(result.succeeded_count(), 2);
        assert_eq!(result.failed_count(), 1);
        assert!(!result.is_complete_success());
    }
}
