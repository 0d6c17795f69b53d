//! Runtime configuration shared by the server and the CLI.
//!
//! Every setting can come from a flag or an environment variable; the API
//! key has no default and must be supplied.

use std::num::NonZeroUsize;
use std::sync::Arc;

use agents::{AgentError, AgentRegistry};
use catalog::{CatalogError, RegionCode};
use clap::Args;
use provider::{DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TMDB_BASE_URL, ProviderError, TmdbClient, TmdbConfig};
use thiserror::Error;

use crate::orchestrator::Orchestrator;

/// Errors raised while turning configuration into a running orchestrator
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid watch region: {0}")]
    Region(#[from] CatalogError),

    #[error("Default count must be greater than zero")]
    ZeroCount,

    #[error("Failed to create provider client: {0}")]
    Provider(#[from] ProviderError),

    #[error("Agent registry is incomplete: {0}")]
    Registry(#[from] AgentError),
}

/// Provider and agent settings
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// TMDb v3 API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: String,

    /// TMDb API base URL
    #[arg(long, env = "TMDB_BASE_URL", default_value = DEFAULT_TMDB_BASE_URL)]
    pub tmdb_base_url: String,

    /// Region used when a request does not name one
    #[arg(long, env = "WATCH_REGION", default_value = "US")]
    pub watch_region: String,

    /// User id recorded for requests that carry none
    #[arg(long, env = "DEFAULT_USER_ID", default_value = "anonymous")]
    pub default_user_id: String,

    /// Number of recommendations when a request does not ask for a positive count
    #[arg(long, env = "DEFAULT_COUNT", default_value_t = 5)]
    pub default_count: usize,

    /// Timeout for each provider request, in milliseconds
    #[arg(long, env = "TMDB_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    pub fn region(&self) -> Result<RegionCode, ConfigError> {
        Ok(self.watch_region.parse()?)
    }

    pub fn count(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.default_count).ok_or(ConfigError::ZeroCount)
    }

    pub fn tmdb_config(&self) -> TmdbConfig {
        TmdbConfig {
            base_url: self.tmdb_base_url.clone(),
            api_key: self.tmdb_api_key.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    /// Build the provider client, the agent registry and the orchestrator.
    ///
    /// The registry is checked here so a misconfiguration fails at startup
    /// rather than on the first request.
    pub fn build_orchestrator(&self) -> Result<Orchestrator, ConfigError> {
        let region = self.region()?;
        let client = TmdbClient::new(self.tmdb_config())?;
        let registry = AgentRegistry::standard(Arc::new(client), self.count()?, region.clone());

        let orchestrator = Orchestrator::new(registry, self.default_user_id.clone(), region);
        orchestrator.verify()?;
        Ok(orchestrator)
    }
}
