//! The host view's current document selection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use docbatch_core::{DocumentId, DocumentRef};

/// Selected documents in the order they were picked.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    documents: IndexMap<DocumentId, DocumentRef>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Re-selecting keeps the original position.
    pub fn select(&mut self, document: DocumentRef) {
        self.documents.entry(document.id.clone()).or_insert(document);
    }

    /// Add every document in `documents`.
    pub fn select_all(&mut self, documents: impl IntoIterator<Item = DocumentRef>) {
        for document in documents {
            self.select(document);
        }
    }

    /// Remove a document. Returns whether it was selected.
    pub fn deselect(&mut self, id: &DocumentId) -> bool {
        self.documents.shift_remove(id).is_some()
    }

    /// Flip a document's membership. Returns whether it is now selected.
    pub fn toggle(&mut self, document: DocumentRef) -> bool {
        if self.deselect(&document.id) {
            false
        } else {
            self.select(document);
            true
        }
    }

    /// Check if a document is selected.
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// Number of selected documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Drop every selected document.
    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Copy of the selected documents in selection order.
    pub fn documents(&self) -> Vec<DocumentRef> {
        self.documents.values().cloned().collect()
    }
}

/// Selection shared between the host view and the coordinator.
#[derive(Debug, Clone, Default)]
pub struct SharedSelection(Arc<Mutex<SelectionSet>>);

impl SharedSelection {
    /// Create an empty shared selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the selection for reading or mutation.
    pub fn lock(&self) -> MutexGuard<'_, SelectionSet> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the selected documents in selection order.
    pub fn documents(&self) -> Vec<DocumentRef> {
        self.lock().documents()
    }
}
