//! RecommenderAgent: `Intent` -> ordered candidate list.
//!
//! ## Algorithm
//! 1. Pick the tool from the intent's lookup axis:
//!    - query: `search_by_text`
//!    - seed title: resolve the seed via `search_by_text`, then `similar_to`
//!    - genre: resolve the name via `list_genres`, then `discover_by_genre`
//! 2. Read result pages until `count` movies are collected, the provider has
//!    no more pages, or the page limit is hit
//! 3. Drop repeats across pages, keep provider order, truncate to `count`

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use catalog::{Candidate, GenreId, Intent, Lookup, MovieId, parse_genre_list, parse_movie_page};
use provider::{Tool, ToolParams, ToolProvider, tool_params};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{AgentError, Result};
use crate::message::{Message, Payload};
use crate::traits::Agent;

pub const RECOMMENDER_AGENT: &str = "RecommenderAgent";
pub const CANDIDATES_TAG: &str = "recommend.candidates";

/// Result pages read per request at most
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Movies TMDb returns per result page
const PROVIDER_PAGE_SIZE: usize = 20;

/// Produces candidate movies for an intent
#[derive(Clone)]
pub struct RecommenderAgent {
    provider: Arc<dyn ToolProvider>,
    max_pages: u32,
}

impl RecommenderAgent {
    pub fn new(provider: Arc<dyn ToolProvider>) -> Self {
        Self {
            provider,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Override the page limit (builder pattern)
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Produce up to `intent.count` candidates.
    ///
    /// Fewer matches than requested is fine; none at all is
    /// `NoCandidatesFound`.
    pub async fn recommend(&self, intent: &Intent) -> Result<Vec<Candidate>> {
        let count = intent.count.get();
        let (tool, params, described) = match &intent.lookup {
            Lookup::Query(query) => (
                Tool::SearchByText,
                tool_params(json!({ "query": query })),
                format!("query '{query}'"),
            ),
            Lookup::SeedTitle(title) => {
                let movie_id = self.resolve_seed(title).await?;
                (
                    Tool::SimilarTo,
                    tool_params(json!({ "movie_id": movie_id })),
                    format!("seed movie '{title}'"),
                )
            }
            Lookup::Genre(name) => {
                let genre_id = self.resolve_genre(name).await?;
                (
                    Tool::DiscoverByGenre,
                    tool_params(json!({ "genre_id": genre_id })),
                    format!("genre '{name}'"),
                )
            }
        };

        let candidates = self.collect(tool, params, count).await?;
        if candidates.is_empty() {
            return Err(AgentError::NoCandidatesFound(format!(
                "no movies matched {described}"
            )));
        }

        info!(
            "Recommended {} of {} requested candidates for {}",
            candidates.len(),
            count,
            described
        );
        Ok(candidates)
    }

    /// Map a seed title to the provider id of its best search match
    async fn resolve_seed(&self, title: &str) -> Result<MovieId> {
        let body = self
            .provider
            .call(
                Tool::SearchByText.name(),
                tool_params(json!({ "query": title, "page": 1 })),
            )
            .await?;
        let page = parse_movie_page(&body)?;

        let seed = page.movies.first().ok_or_else(|| {
            AgentError::NoCandidatesFound(format!("seed movie '{title}' not found"))
        })?;
        debug!("Seed '{}' resolved to {} ({})", title, seed.title, seed.id);
        Ok(seed.id)
    }

    /// Map a genre name (case-insensitive) or numeric id to a genre id
    async fn resolve_genre(&self, name: &str) -> Result<GenreId> {
        if let Ok(id) = name.trim().parse::<GenreId>() {
            return Ok(id);
        }

        let body = self
            .provider
            .call(Tool::ListGenres.name(), ToolParams::new())
            .await?;
        let genres = parse_genre_list(&body)?;

        genres
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| AgentError::InvalidIntent(format!("unknown genre '{name}'")))
    }

    async fn collect(&self, tool: Tool, params: ToolParams, count: usize) -> Result<Vec<Candidate>> {
        let mut seen = HashSet::new();
        // count comes from the request and is unbounded; reserve only what the pages can hold
        let reserve = PROVIDER_PAGE_SIZE.saturating_mul(self.max_pages as usize);
        let mut movies = Vec::with_capacity(count.min(reserve));
        let mut page = 1;

        loop {
            let mut page_params = params.clone();
            page_params.insert("page".to_string(), json!(page));

            let body = self.provider.call(tool.name(), page_params).await?;
            let parsed = parse_movie_page(&body)?;
            let has_more = parsed.has_more();
            debug!(
                "{} page {}/{} returned {} movies",
                tool,
                parsed.page,
                parsed.total_pages,
                parsed.movies.len()
            );

            movies.extend(parsed.movies.into_iter().filter(|m| seen.insert(m.id)));

            if movies.len() >= count || !has_more || page >= self.max_pages {
                break;
            }
            page += 1;
        }

        movies.truncate(count);
        Ok(movies)
    }
}

#[async_trait]
impl Agent for RecommenderAgent {
    fn name(&self) -> &str {
        RECOMMENDER_AGENT
    }

    async fn handle(&self, message: Message) -> Result<Message> {
        let Payload::Intent(intent) = &message.payload else {
            return Err(AgentError::UnexpectedPayload {
                agent: RECOMMENDER_AGENT.to_string(),
                expected: "intent",
                found: message.payload.kind(),
            });
        };

        let candidates = self.recommend(intent).await?;
        Ok(message.reply(CANDIDATES_TAG, Payload::Candidates(candidates)))
    }
}
