//! The envelope agents exchange.
//!
//! A `Message` is created per hop and dropped once the next agent has
//! consumed it; nothing outlives the request.

use std::collections::BTreeMap;

use catalog::{Candidate, Intent, RecommendRequest};
use serde::{Deserialize, Serialize};

/// Context key carrying the requesting user's id
pub const CONTEXT_USER_ID: &str = "user_id";
/// Context key carrying the resolved watch region
pub const CONTEXT_REGION: &str = "region";

/// Structured data carried by a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Request(RecommendRequest),
    Intent(Intent),
    Candidates(Vec<Candidate>),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Request(_) => "request",
            Payload::Intent(_) => "intent",
            Payload::Candidates(_) => "candidates",
        }
    }
}

/// ACP-style envelope: operation tag, payload and auxiliary context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub intent_tag: String,
    pub payload: Payload,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl Message {
    pub fn new(intent_tag: impl Into<String>, payload: Payload) -> Self {
        Self {
            intent_tag: intent_tag.into(),
            payload,
            context: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    /// Build the next hop's message, carrying this message's context forward
    pub fn reply(&self, intent_tag: impl Into<String>, payload: Payload) -> Self {
        Self {
            intent_tag: intent_tag.into(),
            payload,
            context: self.context.clone(),
        }
    }
}
