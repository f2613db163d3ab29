//! Status and alert messages produced by the coordinator.

use serde::{Deserialize, Serialize};

/// How prominently a message should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, announced politely.
    Status,
    /// Failure that needs the user's attention.
    Alert,
}

/// Names the undo entry a toast can trigger.
///
/// Pass it back to [`crate::BulkOperationCoordinator::undo`]; the registry
/// decides whether the entry is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UndoToken(pub u64);

/// A message for the notifier to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub severity: Severity,
    pub text: String,
    pub undo: Option<UndoToken>,
}

impl ToastMessage {
    /// Create a status message.
    pub fn status(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Status,
            text: text.into(),
            undo: None,
        }
    }

    /// Create an alert message.
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Alert,
            text: text.into(),
            undo: None,
        }
    }

    /// Attach an undo affordance.
    pub fn with_undo(mut self, token: UndoToken) -> Self {
        self.undo = Some(token);
        self
    }

    /// Check if this is an alert.
    pub fn is_alert(&self) -> bool {
        self.severity == Severity::Alert
    }
}

impl std::fmt::Display for ToastMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
