//! Coordinator configuration types.

use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Batch size above which progress is reported.
pub const DEFAULT_BATCH_THRESHOLD: usize = 10;

/// Configuration for the bulk operation coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CoordinatorConfig {
    /// Batches with more documents than this are dispatched in chunks and
    /// report progress.
    #[builder(default = "DEFAULT_BATCH_THRESHOLD")]
    #[serde(default = "default_batch_threshold")]
    pub batch_threshold: usize,

    /// Number of documents per dispatched chunk.
    #[builder(default = "DEFAULT_BATCH_THRESHOLD")]
    #[serde(default = "default_batch_threshold")]
    pub chunk_size: usize,

    /// How long an archive stays undoable, in seconds.
    #[builder(default = "10")]
    #[serde(default = "default_undo_ttl_secs")]
    pub undo_ttl_secs: u64,
}

fn default_batch_threshold() -> usize {
    DEFAULT_BATCH_THRESHOLD
}

fn default_undo_ttl_secs() -> u64 {
    10
}

impl CoordinatorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be at least 1".to_string());
        }
        Ok(())
    }
}

impl CoordinatorConfig {
    /// Create a new coordinator config builder.
    pub fn builder() -> CoordinatorConfigBuilder {
        CoordinatorConfigBuilder::default()
    }

    /// Undo window as a duration.
    pub fn undo_ttl(&self) -> Duration {
        Duration::from_secs(self.undo_ttl_secs)
    }

    /// Check if a batch of `len` documents is chunked and shows progress.
    pub fn is_batched(&self, len: usize) -> bool {
        len > self.batch_threshold
    }

    /// Check values that serde cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                message: "chunk_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            chunk_size: DEFAULT_BATCH_THRESHOLD,
            undo_ttl_secs: 10,
        }
    }
}

/// Read and deserialize a TOML file.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
