//! Error taxonomy for the agent pipeline.

use catalog::CatalogError;
use provider::ProviderError;
use thiserror::Error;

/// Everything that can go wrong while a request moves through the agents.
///
/// `InvalidIntent` and `NoCandidatesFound` are user-facing outcomes;
/// `ProviderUnavailable` is an upstream fault; the rest indicate a bug or a
/// misconfigured registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Malformed or unresolvable request
    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    /// Valid request, nothing matched
    #[error("No candidates found: {0}")]
    NoCandidatesFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters for tool {tool}: {reason}")]
    InvalidToolParams { tool: String, reason: String },

    #[error(
        "Provider unavailable ({}): {detail}",
        .status.map(|s| format!("status {s}")).unwrap_or_else(|| "no response".to_string())
    )]
    ProviderUnavailable { status: Option<u16>, detail: String },

    #[error("Agent '{0}' is not registered")]
    AgentNotFound(String),

    /// An agent was handed a payload kind it does not handle
    #[error("{agent} expected a {expected} payload but received {found}")]
    UnexpectedPayload {
        agent: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl AgentError {
    /// Whether the caller sent something unusable (4xx-equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::InvalidIntent(_))
    }

    /// Short machine-readable code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            AgentError::InvalidIntent(_) => "invalid_intent",
            AgentError::NoCandidatesFound(_) => "no_candidates_found",
            AgentError::UnknownTool(_) => "unknown_tool",
            AgentError::InvalidToolParams { .. } => "invalid_tool_params",
            AgentError::ProviderUnavailable { .. } => "provider_unavailable",
            AgentError::AgentNotFound(_) => "agent_not_found",
            AgentError::UnexpectedPayload { .. } => "unexpected_payload",
        }
    }
}

impl From<ProviderError> for AgentError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownTool(name) => AgentError::UnknownTool(name),
            ProviderError::InvalidParams { tool, reason } => AgentError::InvalidToolParams {
                tool: tool.to_string(),
                reason,
            },
            ProviderError::Unavailable { status, detail } => {
                AgentError::ProviderUnavailable { status, detail }
            }
            err @ ProviderError::MissingApiKey => AgentError::ProviderUnavailable {
                status: None,
                detail: err.to_string(),
            },
        }
    }
}

/// Provider payloads that fail to normalise count as an upstream fault
impl From<CatalogError> for AgentError {
    fn from(err: CatalogError) -> Self {
        AgentError::ProviderUnavailable {
            status: None,
            detail: format!("malformed provider response: {err}"),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, AgentError>;
