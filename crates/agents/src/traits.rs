//! Core trait for pipeline agents.
//!
//! An agent is a stateless component with one entry point. The orchestrator
//! composes agents by feeding each reply into the next agent.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// Core trait every agent implements.
///
/// ## Design Note
/// - `Send + Sync` so one registry can serve concurrent requests
/// - `handle` takes the message by value; the reply is a new message
/// - Agents keep no per-request state between calls
#[async_trait]
pub trait Agent: Send + Sync {
    /// Registry name of this agent (for routing and logging)
    fn name(&self) -> &str;

    /// Process one message and produce the reply for the next hop
    async fn handle(&self, message: Message) -> Result<Message>;
}
