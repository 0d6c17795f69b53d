//! # Recommendation Orchestrator
//!
//! Routes one recommendation request through the agents:
//! 1. UserIntentAgent: raw request -> intent
//! 2. RecommenderAgent: intent -> candidates
//! 3. AvailabilityAgent: candidates -> candidates with watch offers
//!
//! Each agent's reply becomes the next agent's message. Errors propagate
//! unchanged, except "no candidates", which becomes a `no_results` response.
//! Nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use agents::{
    AVAILABILITY_AGENT, AgentError, AgentRegistry, CONTEXT_REGION, CONTEXT_USER_ID, Message,
    Payload, RECOMMENDER_AGENT, USER_INTENT_AGENT,
};
use catalog::{Candidate, MovieId, RecommendRequest, RecommendResponse, RegionCode, WhereToWatch};
use tracing::{error, info, warn};

/// Tag of the message that starts a recommendation
pub const RECOMMEND_TAG: &str = "recommend";
/// Tag of a direct availability lookup
pub const WHERE_TO_WATCH_TAG: &str = "where_to_watch";

/// Agents a recommendation passes through, in order
pub const PIPELINE: [&str; 3] = [USER_INTENT_AGENT, RECOMMENDER_AGENT, AVAILABILITY_AGENT];

const ORCHESTRATOR: &str = "Orchestrator";

/// Entry point for recommendation and availability requests.
///
/// Cheap to clone; clones share the read-only registry.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    default_user_id: String,
    default_region: RegionCode,
}

impl Orchestrator {
    /// Create an orchestrator over an already-built registry
    ///
    /// # Arguments
    /// * `registry` - Agents to route through; never modified afterwards
    /// * `default_user_id` - Used when a request carries no user id
    /// * `default_region` - Used for direct lookups without a region
    pub fn new(
        registry: AgentRegistry,
        default_user_id: impl Into<String>,
        default_region: RegionCode,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            default_user_id: default_user_id.into(),
            default_region,
        }
    }

    /// Check that every pipeline agent is registered
    pub fn verify(&self) -> Result<(), AgentError> {
        for name in PIPELINE {
            self.registry.get(name)?;
        }
        Ok(())
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Main entry point: recommend movies for a raw request
    ///
    /// # Returns
    /// * `Ok` with status `ok` and the enriched candidates
    /// * `Ok` with status `no_results` when nothing matched
    /// * `Err` for invalid requests, provider failures and registry faults
    pub async fn route(&self, request: RecommendRequest) -> Result<RecommendResponse, AgentError> {
        let start_time = Instant::now();

        let user_id = request
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.default_user_id)
            .to_string();
        info!("Routing recommendation request for user {}", user_id);

        let message = Message::new(RECOMMEND_TAG, Payload::Request(request))
            .with_context(CONTEXT_USER_ID, user_id.clone());

        match self.run_pipeline(message).await {
            Ok(movies) => {
                info!(
                    "Returning {} recommendations for user {} in {:.2?}",
                    movies.len(),
                    user_id,
                    start_time.elapsed()
                );
                Ok(RecommendResponse::ok(movies))
            }
            Err(AgentError::NoCandidatesFound(reason)) => {
                info!("No results for user {}: {}", user_id, reason);
                Ok(RecommendResponse::no_results(reason))
            }
            Err(e) => {
                match &e {
                    AgentError::ProviderUnavailable { status, detail } => error!(
                        "Provider failure for user {} (status {:?}): {}",
                        user_id, status, detail
                    ),
                    other => warn!("Request for user {} failed: {}", user_id, other),
                }
                Err(e)
            }
        }
    }

    /// Offers for a single movie, straight from the AvailabilityAgent
    pub async fn where_to_watch(
        &self,
        movie_id: MovieId,
        region: Option<&str>,
    ) -> Result<WhereToWatch, AgentError> {
        let region = match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => raw
                .parse::<RegionCode>()
                .map_err(|e| AgentError::InvalidIntent(e.to_string()))?,
            None => self.default_region.clone(),
        };

        let message = Message::new(
            WHERE_TO_WATCH_TAG,
            Payload::Candidates(vec![Candidate::new(movie_id, String::new())]),
        )
        .with_context(CONTEXT_REGION, region.to_string());

        let reply = self.registry.dispatch(AVAILABILITY_AGENT, message).await?;
        let offers = into_candidates(reply)?
            .into_iter()
            .next()
            .map(|c| c.offers)
            .unwrap_or_default();

        Ok(WhereToWatch {
            movie_id,
            region,
            offers,
        })
    }

    /// Feed the message through every pipeline agent in order
    async fn run_pipeline(&self, message: Message) -> Result<Vec<Candidate>, AgentError> {
        let mut message = message;
        for agent in PIPELINE {
            let started = Instant::now();
            message = self.registry.dispatch(agent, message).await?;
            info!(
                "{} replied '{}' in {:.2?}",
                agent,
                message.intent_tag,
                started.elapsed()
            );
        }
        into_candidates(message)
    }
}

fn into_candidates(message: Message) -> Result<Vec<Candidate>, AgentError> {
    match message.payload {
        Payload::Candidates(candidates) => Ok(candidates),
        other => Err(AgentError::UnexpectedPayload {
            agent: ORCHESTRATOR.to_string(),
            expected: "candidates",
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agents::DEFAULT_COUNT;
    use catalog::{OfferKind, ResponseStatus};
    use httpmock::prelude::*;
    use provider::{TmdbClient, TmdbConfig};
    use serde_json::{Value, json};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn movie_list(ids: &[u64], prefix: &str) -> Value {
        let results: Vec<Value> = ids
            .iter()
            .map(|id| json!({"id": id, "title": format!("{prefix} {id}"), "overview": "..."}))
            .collect();
        json!({"page": 1, "total_pages": 1, "results": results})
    }

    fn watch_providers(movie_id: u64, region: &str) -> Value {
        let mut results = serde_json::Map::new();
        results.insert(
            region.to_string(),
            json!({
                "flatrate": [{"provider_id": 8, "provider_name": "Netflix", "display_priority": 0}],
                "buy": [{"provider_id": 3, "provider_name": "Google Play Movies", "display_priority": 7}]
            }),
        );
        json!({"id": movie_id, "results": results})
    }

    /// Orchestrator wired to a mock TMDb server
    fn build_test_orchestrator(server: &MockServer, default_region: &str) -> Orchestrator {
        let client = TmdbClient::new(TmdbConfig {
            base_url: server.base_url(),
            api_key: "test-key".to_string(),
            request_timeout_ms: 5_000,
        })
        .expect("Failed to create TMDb client");
        let region: RegionCode = default_region.parse().expect("valid region");

        let registry = AgentRegistry::standard(Arc::new(client), DEFAULT_COUNT, region.clone());
        Orchestrator::new(registry, "tester", region)
    }

    // ============================================================================
    // End-to-end scenarios
    // ============================================================================

    #[tokio::test]
    async fn test_query_request_is_truncated_and_enriched() {
        let server = MockServer::start_async().await;
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/search/movie")
                .query_param("query", "Batman");
            then.status(200)
                .json_body(movie_list(&[268, 364, 414, 415, 272], "Batman"));
        });
        let watch = server.mock(|when, then| {
            when.method(GET).path("/movie/268/watch/providers");
            then.status(200).json_body(watch_providers(268, "US"));
        });
        // 364 has no mock: the lookup 404s and the candidate keeps empty offers

        let orchestrator = build_test_orchestrator(&server, "US");
        let response = orchestrator
            .route(RecommendRequest {
                user_id: Some("tester".to_string()),
                query: Some("Batman".to_string()),
                num: Some(2),
                region: Some("US".to_string()),
                ..RecommendRequest::default()
            })
            .await
            .expect("route failed");

        search.assert();
        watch.assert();
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.movies.len(), 2);
        assert_eq!(response.movies[0].id, 268);
        assert_eq!(response.movies[1].id, 364);

        let offers = &response.movies[0].offers;
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].kind, OfferKind::Stream);
        assert!(offers.iter().all(|o| o.region.as_str() == "US"));
        assert!(response.movies[1].offers.is_empty());
    }

    #[tokio::test]
    async fn test_seed_request_uses_similar_titles() {
        let server = MockServer::start_async().await;
        let seed_search = server.mock(|when, then| {
            when.method(GET)
                .path("/search/movie")
                .query_param("query", "Inception");
            then.status(200).json_body(movie_list(&[27205], "Inception"));
        });
        let similar = server.mock(|when, then| {
            when.method(GET).path("/movie/27205/similar");
            then.status(200)
                .json_body(movie_list(&[1124, 157336, 155, 49026], "Similar"));
        });

        let orchestrator = build_test_orchestrator(&server, "US");
        let response = orchestrator
            .route(RecommendRequest {
                seed_movie: Some("Inception".to_string()),
                num: Some(3),
                region: Some("US".to_string()),
                ..RecommendRequest::default()
            })
            .await
            .expect("route failed");

        seed_search.assert_calls(1);
        similar.assert_calls(1);
        assert_eq!(response.status, ResponseStatus::Ok);
        assert!(response.movies.len() <= 3);
        assert!(response.movies.iter().all(|m| m.title.starts_with("Similar")));
    }

    #[tokio::test]
    async fn test_genre_request_without_region_uses_default_region() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/genre/movie/list");
            then.status(200).json_body(json!({
                "genres": [{"id": 28, "name": "Action"}, {"id": 18, "name": "Drama"}]
            }));
        });
        let discover = server.mock(|when, then| {
            when.method(GET)
                .path("/discover/movie")
                .query_param("with_genres", "28");
            then.status(200).json_body(movie_list(&[550, 603, 680], "Action"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/movie/550/watch/providers");
            then.status(200).json_body(watch_providers(550, "CA"));
        });

        let orchestrator = build_test_orchestrator(&server, "CA");
        let response = orchestrator
            .route(RecommendRequest {
                genre: Some("action".to_string()),
                num: Some(2),
                ..RecommendRequest::default()
            })
            .await
            .expect("route failed");

        discover.assert();
        assert_eq!(response.movies.len(), 2);
        let offers = &response.movies[0].offers;
        assert!(!offers.is_empty());
        assert!(offers.iter().all(|o| o.region.as_str() == "CA"));
    }

    #[tokio::test]
    async fn test_empty_search_is_no_results_response() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/search/movie");
            then.status(200).json_body(movie_list(&[], "none"));
        });

        let orchestrator = build_test_orchestrator(&server, "US");
        let response = orchestrator
            .route(RecommendRequest {
                query: Some("qwertyuiop".to_string()),
                ..RecommendRequest::default()
            })
            .await
            .expect("no results should not be an error");

        assert_eq!(response.status, ResponseStatus::NoResults);
        assert!(response.movies.is_empty());
        assert!(response.reason.is_some());
    }

    // ============================================================================
    // Error propagation
    // ============================================================================

    #[tokio::test]
    async fn test_invalid_request_propagates_without_provider_calls() {
        let server = MockServer::start_async().await;
        let any = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({}));
        });

        let orchestrator = build_test_orchestrator(&server, "US");
        let err = orchestrator
            .route(RecommendRequest {
                user_id: Some("tester".to_string()),
                ..RecommendRequest::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::InvalidIntent(_)));
        any.assert_calls(0);
    }

    #[tokio::test]
    async fn test_provider_outage_propagates_with_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/search/movie");
            then.status(503).body("upstream maintenance");
        });

        let orchestrator = build_test_orchestrator(&server, "US");
        let err = orchestrator
            .route(RecommendRequest {
                query: Some("Heat".to_string()),
                ..RecommendRequest::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::ProviderUnavailable { status: Some(503), .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_agent_is_reported() {
        let registry = AgentRegistry::new().register(agents::UserIntentAgent::new(
            DEFAULT_COUNT,
            "US".parse().unwrap(),
        ));
        let orchestrator = Orchestrator::new(registry, "tester", "US".parse().unwrap());

        assert_eq!(
            orchestrator.verify().unwrap_err(),
            AgentError::AgentNotFound(RECOMMENDER_AGENT.to_string())
        );

        let err = orchestrator
            .route(RecommendRequest {
                query: Some("Heat".to_string()),
                ..RecommendRequest::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::AgentNotFound(RECOMMENDER_AGENT.to_string()));
    }

    // ============================================================================
    // where_to_watch
    // ============================================================================

    #[tokio::test]
    async fn test_where_to_watch_returns_region_offers() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/movie/550/watch/providers");
            then.status(200).json_body(watch_providers(550, "GB"));
        });

        let orchestrator = build_test_orchestrator(&server, "US");
        let result = orchestrator
            .where_to_watch(550, Some("gb"))
            .await
            .expect("where_to_watch failed");

        assert_eq!(result.movie_id, 550);
        assert_eq!(result.region.as_str(), "GB");
        assert_eq!(result.offers.len(), 2);
    }

    #[tokio::test]
    async fn test_where_to_watch_rejects_bad_region() {
        let server = MockServer::start_async().await;
        let orchestrator = build_test_orchestrator(&server, "US");

        let err = orchestrator
            .where_to_watch(550, Some("Narnia"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::InvalidIntent(_)));
    }
}
