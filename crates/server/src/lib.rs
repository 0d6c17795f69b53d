//! Server crate for the movie-agents recommender.
//!
//! This crate contains the orchestrator that routes requests through the
//! agents, the runtime configuration, and the HTTP routes in front of them.

pub mod config;
pub mod http;
pub mod orchestrator;

pub use config::{ConfigError, ServerConfig};
pub use http::{ApiError, build_router};
pub use orchestrator::Orchestrator;
