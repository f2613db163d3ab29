//! Single-slot undo registry for reversible bulk operations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docbatch_core::{BulkOperationKind, DocumentId, DocumentRef};

use crate::toast::UndoToken;

/// Snapshot of a reversible batch taken before dispatch.
///
/// It only becomes an [`UndoEntry`] once the server confirms the batch.
#[derive(Debug, Clone)]
pub struct PendingUndo {
    kind: BulkOperationKind,
    original_documents: Vec<DocumentRef>,
}

impl PendingUndo {
    /// Snapshot `documents` for a batch of `kind`.
    ///
    /// Returns `None` for kinds that have no compensating action.
    pub fn snapshot(kind: BulkOperationKind, documents: &[DocumentRef]) -> Option<Self> {
        kind.is_reversible().then(|| Self {
            kind,
            original_documents: documents.to_vec(),
        })
    }

    /// Turn the snapshot into a consumable entry.
    pub fn confirm(self, committed_ids: Vec<DocumentId>, ttl: Duration) -> UndoEntry {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        UndoEntry {
            id: 0,
            kind: self.kind,
            original_documents: self.original_documents,
            committed_ids,
            expires_at: Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// A confirmed reversible batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    /// Unique ID for this entry, assigned by the registry.
    pub id: u64,
    /// The operation that was performed.
    pub kind: BulkOperationKind,
    /// The documents as they were selected.
    pub original_documents: Vec<DocumentRef>,
    /// The ids the server confirmed.
    pub committed_ids: Vec<DocumentId>,
    /// After this instant the entry can no longer be consumed.
    pub expires_at: DateTime<Utc>,
}

impl UndoEntry {
    /// Check if the undo window has closed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check if the entry covers any of `ids`.
    pub fn overlaps(&self, ids: &[DocumentId]) -> bool {
        ids.iter().any(|id| {
            self.committed_ids.contains(id) || self.original_documents.iter().any(|d| &d.id == id)
        })
    }
}

/// Holds at most one live [`UndoEntry`].
///
/// Registering replaces the previous entry; undos never stack.
#[derive(Debug, Default)]
pub struct UndoRegistry {
    entry: Option<UndoEntry>,
    next_id: u64,
}

impl UndoRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `entry` the live entry, dropping any unconsumed predecessor.
    ///
    /// Returns the token that names it.
    pub fn register(&mut self, mut entry: UndoEntry) -> UndoToken {
        entry.id = self.next_id;
        self.next_id += 1;

        if let Some(previous) = self.entry.replace(entry) {
            tracing::debug!(entry = previous.id, "Superseded unconsumed undo entry");
        }

        UndoToken(self.next_id - 1)
    }

    /// Take the live entry if it has not expired.
    ///
    /// A second call returns `None`.
    pub fn consume(&mut self) -> Option<UndoEntry> {
        self.consume_at(Utc::now())
    }

    /// Take the live entry if it has not expired at `now`.
    pub fn consume_at(&mut self, now: DateTime<Utc>) -> Option<UndoEntry> {
        let entry = self.entry.take()?;
        if entry.is_expired_at(now) {
            tracing::debug!(entry = entry.id, "Undo entry expired");
            return None;
        }
        Some(entry)
    }

    /// Take the live entry only if `token` still names it.
    ///
    /// A token from a superseded toast leaves the live entry in place.
    pub fn consume_token(&mut self, token: UndoToken) -> Option<UndoEntry> {
        if self.entry.as_ref().is_some_and(|e| e.id == token.0) {
            return self.consume();
        }
        None
    }

    /// Drop the live entry if it covers any of `ids`.
    ///
    /// Returns the token of the dropped entry.
    pub fn invalidate_overlapping(&mut self, ids: &[DocumentId]) -> Option<UndoToken> {
        if self.entry.as_ref().is_some_and(|e| e.overlaps(ids)) {
            return self.entry.take().map(|e| UndoToken(e.id));
        }
        None
    }

    /// Check if an entry is registered.
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(ids: &[&str]) -> Vec<DocumentRef> {
        ids.iter()
            .map(|id| DocumentRef::new(*id, format!("{id}.pdf"), None))
            .collect()
    }

    fn entry(ids: &[&str]) -> UndoEntry {
        let documents = docs(ids);
        let committed = documents.iter().map(|d| d.id.clone()).collect();
        PendingUndo::snapshot(BulkOperationKind::Archive, &documents)
            .unwrap()
            .confirm(committed, Duration::from_secs(60))
    }

    #[test]
    fn test_snapshot_only_for_reversible_kinds() {
        let documents = docs(&["doc-1"]);
        assert!(PendingUndo::snapshot(BulkOperationKind::Archive, &documents).is_some());
        assert!(PendingUndo::snapshot(BulkOperationKind::Delete, &documents).is_none());
        assert!(PendingUndo::snapshot(BulkOperationKind::Move, &documents).is_none());
    }

    #[test]
    fn test_consume_is_single_shot() {
        let mut registry = UndoRegistry::new();
        registry.register(entry(&["doc-1"]));

        assert!(registry.consume().is_some());
        assert!(registry.consume().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces_previous() {
        let mut registry = UndoRegistry::new();
        let first = registry.register(entry(&["doc-1"]));
        let second = registry.register(entry(&["doc-2"]));
        assert_ne!(first, second);

        let live = registry.consume().unwrap();
        assert_eq!(live.id, second.0);
        assert_eq!(live.committed_ids, vec![DocumentId::new("doc-2")]);
        assert!(registry.consume().is_none());
    }

    #[test]
    fn test_stale_token_does_not_consume() {
        let mut registry = UndoRegistry::new();
        let stale = registry.register(entry(&["doc-1"]));
        let live = registry.register(entry(&["doc-2"]));

        assert!(registry.consume_token(stale).is_none());
        assert!(!registry.is_empty());

        let entry = registry.consume_token(live).unwrap();
        assert_eq!(entry.committed_ids, vec![DocumentId::new("doc-2")]);
        assert!(registry.consume_token(live).is_none());
    }

    #[test]
    fn test_expired_entry_is_not_consumed() {
        let mut registry = UndoRegistry::new();
        registry.register(entry(&["doc-1"]));

        let later = Utc::now() + chrono::Duration::seconds(120);
        assert!(registry.consume_at(later).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalidate_overlapping() {
        let mut registry = UndoRegistry::new();
        registry.register(entry(&["doc-1", "doc-2"]));

        assert!(registry
            .invalidate_overlapping(&[DocumentId::new("doc-9")])
            .is_none());
        assert!(!registry.is_empty());

        assert!(registry
            .invalidate_overlapping(&[DocumentId::new("doc-2")])
            .is_some());
        assert!(registry.is_empty());
    }
}
