//! Error types for bulk document operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FolderId;

/// A request that must not be dispatched.
///
/// Validation errors are surfaced inline next to the triggering control and
/// are recovered by changing the input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Nothing is selected.
    #[error("No documents selected")]
    EmptySelection,

    /// A move was requested without a destination.
    #[error("No target folder chosen")]
    MissingTargetFolder,

    /// Every selected document already lives in the move target.
    #[error("All selected documents are already in folder {target}")]
    SameFolder { target: FolderId },
}

/// The network call for a batch rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// The request did not complete in time.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Invalid response: {message}")]
    Decode { message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl TransportError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected shape.
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
