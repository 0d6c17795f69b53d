//! TMDb v3 implementation of [`ToolProvider`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{ProviderError, Tool, ToolParams, ToolProvider};

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

const DEFAULT_SORT: &str = "popularity.desc";
/// Upper bound on how much of an error body is kept in `ProviderError` details
const MAX_DETAIL_LEN: usize = 512;

/// Connection settings for [`TmdbClient`]
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// HTTP client for the TMDb API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    config: TmdbConfig,
}

impl TmdbClient {
    /// Build a client.
    ///
    /// Fails with [`ProviderError::MissingApiKey`] when the key is blank.
    pub fn new(config: TmdbConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|e| ProviderError::Unavailable {
                status: None,
                detail: format!("failed to build HTTP client: {}", e.without_url()),
            })?;

        info!(
            "TMDb client ready (base {}, timeout {}ms)",
            config.base_url, config.request_timeout_ms
        );
        Ok(Self { client, config })
    }

    /// Base URL this client sends requests to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Issue one GET and decode the JSON body
    async fn get(
        &self,
        tool: Tool,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!("Calling {} -> GET {}", tool, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.config.api_key.trim())])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!(
                        "request timed out after {}ms",
                        self.config.request_timeout_ms
                    )
                } else {
                    e.without_url().to_string()
                };
                error!("Transport error while calling {}: {}", tool, detail);
                ProviderError::Unavailable {
                    status: None,
                    detail,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = truncate_detail(&body);
            error!("{} returned HTTP {}: {}", tool, status.as_u16(), detail);
            return Err(ProviderError::Unavailable {
                status: Some(status.as_u16()),
                detail,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            let e = e.without_url();
            error!("{} returned an undecodable body: {}", tool, e);
            ProviderError::Unavailable {
                status: Some(status.as_u16()),
                detail: format!("invalid JSON body: {e}"),
            }
        })
    }
}

#[async_trait]
impl ToolProvider for TmdbClient {
    async fn call(&self, tool_name: &str, params: ToolParams) -> Result<Value, ProviderError> {
        let tool: Tool = tool_name.parse()?;
        tool.check_params(&params)?;

        let page = ("page", read_page(tool, &params)?.to_string());
        match tool {
            Tool::SearchByText => {
                let query = read_text(tool, &params, "query")?;
                self.get(tool, "/search/movie", &[("query", query), page])
                    .await
            }
            Tool::SimilarTo => {
                let movie_id = read_id(tool, &params, "movie_id")?;
                self.get(tool, &format!("/movie/{movie_id}/similar"), &[page])
                    .await
            }
            Tool::DiscoverByGenre => {
                let genre_id = read_id(tool, &params, "genre_id")?;
                let sort_by = params
                    .get("sort_by")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_SORT)
                    .to_string();
                self.get(
                    tool,
                    "/discover/movie",
                    &[
                        ("with_genres", genre_id.to_string()),
                        ("sort_by", sort_by),
                        page,
                    ],
                )
                .await
            }
            Tool::GetWatchProviders => {
                let movie_id = read_id(tool, &params, "movie_id")?;
                self.get(tool, &format!("/movie/{movie_id}/watch/providers"), &[])
                    .await
            }
            Tool::ListGenres => self.get(tool, "/genre/movie/list", &[]).await,
        }
    }
}

fn invalid(tool: Tool, reason: String) -> ProviderError {
    ProviderError::InvalidParams {
        tool: tool.name(),
        reason,
    }
}

fn read_text(tool: Tool, params: &ToolParams, name: &str) -> Result<String, ProviderError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid(tool, format!("'{name}' must be a non-empty string")))
}

/// Ids are accepted as JSON numbers or numeric strings
fn read_id(tool: Tool, params: &ToolParams, name: &str) -> Result<u64, ProviderError> {
    let value = params.get(name);
    value
        .and_then(Value::as_u64)
        .or_else(|| value.and_then(Value::as_str).and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| invalid(tool, format!("'{name}' must be a positive integer id")))
}

fn read_page(tool: Tool, params: &ToolParams) -> Result<u64, ProviderError> {
    match params.get("page") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .filter(|&p| p >= 1)
            .ok_or_else(|| invalid(tool, format!("'page' must be >= 1, got {v}"))),
    }
}

fn truncate_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_DETAIL_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_DETAIL_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
