//! Transport configuration.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for the REST transport.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ClientConfig {
    /// Root of the document API, e.g. `https://api.example.com/v1/`.
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[builder(default = "30")]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request.
    #[builder(default)]
    #[serde(default)]
    pub bearer_token: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(()),
            Some(_) => Err("Base URL cannot be empty".to_string()),
            None => Err("Base URL is required".to_string()),
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a config with default timeout and no token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            bearer_token: None,
        }
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
