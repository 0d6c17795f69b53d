//! Cooperating agents for the recommendation pipeline.
//!
//! This crate provides:
//! - The `Agent` trait and the `Message` envelope agents exchange
//! - `UserIntentAgent`, `RecommenderAgent` and `AvailabilityAgent`
//! - `AgentRegistry`, the named-agent lookup the orchestrator routes through
//! - `AgentError`, the error taxonomy for the whole pipeline
//!
//! ## Architecture
//! A request moves through the agents in a fixed order:
//! 1. UserIntentAgent turns the raw request into an `Intent`
//! 2. RecommenderAgent turns the intent into candidate movies
//! 3. AvailabilityAgent attaches watch offers to every candidate
//!
//! Agents hold no per-request state; all provider access goes through
//! `provider::ToolProvider`.
//!
//! ## Example Usage
//! ```ignore
//! use agents::{AgentRegistry, Message, Payload, USER_INTENT_AGENT};
//!
//! let registry = AgentRegistry::standard(provider, DEFAULT_COUNT, "US".parse()?);
//! let reply = registry
//!     .dispatch(USER_INTENT_AGENT, Message::new("recommend", Payload::Request(request)))
//!     .await?;
//! ```

pub mod availability;
pub mod error;
pub mod intent;
pub mod message;
pub mod recommender;
pub mod registry;
pub mod traits;

// Re-export main types
pub use availability::{AVAILABILITY_AGENT, AvailabilityAgent, ENRICHED_TAG};
pub use error::{AgentError, Result};
pub use intent::{DEFAULT_COUNT, INTENT_TAG, USER_INTENT_AGENT, UserIntentAgent};
pub use message::{CONTEXT_REGION, CONTEXT_USER_ID, Message, Payload};
pub use recommender::{CANDIDATES_TAG, DEFAULT_MAX_PAGES, RECOMMENDER_AGENT, RecommenderAgent};
pub use registry::AgentRegistry;
pub use traits::Agent;
