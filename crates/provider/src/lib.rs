//! Tool-call adapter for the external movie metadata/availability provider.
//!
//! Agents never talk HTTP themselves. They issue named tool calls
//! (`search_by_text`, `similar_to`, ...) through the [`ToolProvider`] trait and
//! get raw JSON back. This crate provides:
//! - The fixed [`Tool`] set and parameter validation
//! - [`TmdbClient`], the HTTP implementation against TMDb v3
//! - [`ProviderError`], the error surface shared by every implementation
//!
//! No retries and no caching: a failed call is reported once and the caller
//! decides what to do with it.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod tmdb;
pub mod tool;

pub use tmdb::{DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TMDB_BASE_URL, TmdbClient, TmdbConfig};
pub use tool::{Tool, ToolParams, tool_params};

/// Errors that can occur when calling the provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Tool name outside the known set; a dispatch bug on the caller's side
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A known tool called without the parameters it needs
    #[error("Invalid parameters for {tool}: {reason}")]
    InvalidParams { tool: &'static str, reason: String },

    /// Upstream failure: transport error, timeout, non-2xx status or bad body
    #[error(
        "Provider unavailable ({}): {detail}",
        .status.map(|s| format!("status {s}")).unwrap_or_else(|| "no response".to_string())
    )]
    Unavailable { status: Option<u16>, detail: String },

    #[error("Provider API key is missing")]
    MissingApiKey,
}

/// Anything that can execute provider tool calls.
///
/// `tool_name` is validated against [`Tool`] before any work is done, so an
/// unknown name fails with [`ProviderError::UnknownTool`] and never reaches the
/// network.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn call(&self, tool_name: &str, params: ToolParams) -> Result<Value, ProviderError>;
}
