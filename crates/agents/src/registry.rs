//! The named-agent registry.
//!
//! Built once at startup and handed to the orchestrator; read-only afterwards,
//! so concurrent requests can share it behind an `Arc`.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use catalog::RegionCode;
use provider::ToolProvider;
use tracing::debug;

use crate::availability::AvailabilityAgent;
use crate::error::{AgentError, Result};
use crate::intent::UserIntentAgent;
use crate::message::Message;
use crate::recommender::RecommenderAgent;
use crate::traits::Agent;

/// Maps agent names to agents.
///
/// ## Usage
/// ```ignore
/// let registry = AgentRegistry::new()
///     .register(UserIntentAgent::new(DEFAULT_COUNT, region.clone()))
///     .register(RecommenderAgent::new(provider.clone()))
///     .register(AvailabilityAgent::new(provider, region));
///
/// let reply = registry.dispatch(USER_INTENT_AGENT, message).await?;
/// ```
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register the three standard agents over one provider
    pub fn standard(
        provider: Arc<dyn ToolProvider>,
        default_count: NonZeroUsize,
        default_region: RegionCode,
    ) -> Self {
        Self::new()
            .register(UserIntentAgent::new(default_count, default_region.clone()))
            .register(RecommenderAgent::new(provider.clone()))
            .register(AvailabilityAgent::new(provider, default_region))
    }

    /// Add an agent under its own name (builder pattern).
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn register(mut self, agent: impl Agent + 'static) -> Self {
        self.agents.insert(agent.name().to_string(), Arc::new(agent));
        self
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Agent>> {
        self.agents
            .get(name)
            .ok_or_else(|| AgentError::AgentNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Hand `message` to the agent registered as `to`
    pub async fn dispatch(&self, to: &str, message: Message) -> Result<Message> {
        let agent = self.get(to)?;
        debug!("Dispatching '{}' to {}", message.intent_tag, to);
        agent.handle(message).await
    }
}
