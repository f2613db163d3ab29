//! REST transport for docbatch.
//!
//! Provides [`HttpClient`], a [`docbatch_ops::NetworkClient`] that talks to
//! the bulk document endpoints over HTTP.

mod config;
mod http;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use http::HttpClient;
