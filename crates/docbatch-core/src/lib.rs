//! Core types for docbatch.
//!
//! This crate provides the data model shared by the bulk operation
//! coordinator and its transports: document references, requests, results,
//! error taxonomy and configuration.

mod config;
mod error;
mod model;

pub use config::{CoordinatorConfig, CoordinatorConfigBuilder, DEFAULT_BATCH_THRESHOLD, load_toml};
pub use error::{ConfigError, TransportError, ValidationError};
pub use model::{
    BulkOperationKind, BulkOperationRequest, BulkOperationResult, BulkParams, DealId,
    DocumentFailure, DocumentId, DocumentRef, FolderId,
};
