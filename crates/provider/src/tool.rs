//! The fixed set of tool calls the provider adapter understands.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::ProviderError;

/// Named parameters for a tool call
pub type ToolParams = Map<String, Value>;

/// Build `ToolParams` from a `json!({...})` object literal.
///
/// Anything other than an object yields an empty parameter set.
pub fn tool_params(value: Value) -> ToolParams {
    match value {
        Value::Object(map) => map,
        _ => ToolParams::new(),
    }
}

/// Operations exposed by the movie metadata/availability provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Free-text title search: `{query, page?}`
    SearchByText,
    /// Titles similar to a known movie: `{movie_id, page?}`
    SimilarTo,
    /// Browse a genre: `{genre_id, page?, sort_by?}`
    DiscoverByGenre,
    /// Region-keyed streaming/rent/buy offers: `{movie_id}`
    GetWatchProviders,
    /// Genre id/name table: `{}`
    ListGenres,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::SearchByText,
        Tool::SimilarTo,
        Tool::DiscoverByGenre,
        Tool::GetWatchProviders,
        Tool::ListGenres,
    ];

    /// Wire name used in tool calls
    pub fn name(self) -> &'static str {
        match self {
            Tool::SearchByText => "search_by_text",
            Tool::SimilarTo => "similar_to",
            Tool::DiscoverByGenre => "discover_by_genre",
            Tool::GetWatchProviders => "get_watch_providers",
            Tool::ListGenres => "list_genres",
        }
    }

    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Tool::SearchByText => &["query"],
            Tool::SimilarTo | Tool::GetWatchProviders => &["movie_id"],
            Tool::DiscoverByGenre => &["genre_id"],
            Tool::ListGenres => &[],
        }
    }

    /// Reject calls missing a required parameter before anything goes out
    pub fn check_params(self, params: &ToolParams) -> Result<(), ProviderError> {
        for &param in self.required_params() {
            match params.get(param) {
                None | Some(Value::Null) => {
                    return Err(ProviderError::InvalidParams {
                        tool: self.name(),
                        reason: format!("missing required parameter '{param}'"),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl FromStr for Tool {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| ProviderError::UnknownTool(s.to_string()))
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.name().parse::<Tool>().unwrap(), tool);
        }
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let err = "get_trailers".parse::<Tool>().unwrap_err();
        assert!(matches!(err, ProviderError::UnknownTool(name) if name == "get_trailers"));
    }

    #[test]
    fn test_check_params_reports_missing_parameter() {
        let err = Tool::SimilarTo
            .check_params(&tool_params(json!({"page": 1})))
            .unwrap_err();

        match err {
            ProviderError::InvalidParams { tool, reason } => {
                assert_eq!(tool, "similar_to");
                assert!(reason.contains("movie_id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_params_treats_null_as_missing() {
        let params = tool_params(json!({"query": null}));
        assert!(Tool::SearchByText.check_params(&params).is_err());
        assert!(Tool::ListGenres.check_params(&params).is_ok());
    }

    #[test]
    fn test_tool_params_ignores_non_objects() {
        assert!(tool_params(json!([1, 2, 3])).is_empty());
    }
}
