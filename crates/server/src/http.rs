//! HTTP surface for the orchestrator.

use std::sync::Arc;

use agents::AgentError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog::{MovieId, RecommendRequest, RecommendResponse, WhereToWatch};
use serde::Deserialize;
use serde_json::json;

use crate::orchestrator::Orchestrator;

pub const RECOMMEND_ENDPOINT: &str = "/recommend";
pub const WHERE_TO_WATCH_ENDPOINT: &str = "/where_to_watch";
pub const HEALTH_ENDPOINT: &str = "/health";

/// Agent errors rendered as JSON error responses
#[derive(Debug)]
pub struct ApiError(pub AgentError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgentError::InvalidIntent(_) => StatusCode::BAD_REQUEST,
            // only reachable if a caller bypasses Orchestrator::route
            AgentError::NoCandidatesFound(_) => StatusCode::NOT_FOUND,
            AgentError::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AgentError::UnknownTool(_)
            | AgentError::InvalidToolParams { .. }
            | AgentError::AgentNotFound(_)
            | AgentError::UnexpectedPayload { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = if status.is_client_error() {
            "invalid_request_error"
        } else {
            "server_error"
        };
        (
            status,
            Json(json!({
                "error": {
                    "type": error_type,
                    "code": self.0.code(),
                    "message": self.0.to_string(),
                }
            })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct WhereToWatchParams {
    movie_id: MovieId,
    #[serde(default)]
    region: Option<String>,
}

pub fn build_router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route(HEALTH_ENDPOINT, get(handle_health))
        .route(RECOMMEND_ENDPOINT, post(handle_recommend))
        .route(
            WHERE_TO_WATCH_ENDPOINT,
            get(handle_where_to_watch).post(handle_where_to_watch),
        )
        .with_state(orchestrator)
}

async fn handle_health(State(orchestrator): State<Arc<Orchestrator>>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "agents": orchestrator.registry().names(),
        })),
    )
        .into_response()
}

/// Bodies and query strings that fail to deserialize are invalid intents
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AgentError::InvalidIntent(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(AgentError::InvalidIntent(rejection.body_text()))
    }
}

async fn handle_recommend(
    State(orchestrator): State<Arc<Orchestrator>>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(orchestrator.route(request).await?))
}

async fn handle_where_to_watch(
    State(orchestrator): State<Arc<Orchestrator>>,
    params: Result<Query<WhereToWatchParams>, QueryRejection>,
) -> Result<Json<WhereToWatch>, ApiError> {
    let Query(params) = params?;
    let result = orchestrator
        .where_to_watch(params.movie_id, params.region.as_deref())
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agents::{
        Agent, AgentRegistry, AvailabilityAgent, Message, Payload, RECOMMENDER_AGENT,
        USER_INTENT_AGENT,
    };
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use catalog::Candidate;
    use provider::{ProviderError, ToolParams, ToolProvider};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Stands in for an agent and always returns a fixed outcome
    struct ScriptedAgent {
        name: &'static str,
        outcome: Result<Payload, AgentError>,
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(&self, message: Message) -> agents::Result<Message> {
            let payload = self.outcome.clone()?;
            Ok(message.reply("scripted", payload))
        }
    }

    /// Provider with no watch data for anything
    struct EmptyProvider;

    #[async_trait]
    impl ToolProvider for EmptyProvider {
        async fn call(&self, _tool: &str, _params: ToolParams) -> Result<Value, ProviderError> {
            Ok(json!({"id": 0, "results": {}}))
        }
    }

    fn app_failing_with(err: AgentError) -> Router {
        let registry = AgentRegistry::new().register(ScriptedAgent {
            name: USER_INTENT_AGENT,
            outcome: Err(err),
        });
        build_router(Arc::new(Orchestrator::new(
            registry,
            "tester",
            "US".parse().unwrap(),
        )))
    }

    fn app_returning(movies: Vec<Candidate>) -> Router {
        let region: catalog::RegionCode = "US".parse().unwrap();
        let registry = AgentRegistry::new()
            .register(ScriptedAgent {
                name: USER_INTENT_AGENT,
                outcome: Ok(Payload::Request(RecommendRequest::default())),
            })
            .register(ScriptedAgent {
                name: RECOMMENDER_AGENT,
                outcome: Ok(Payload::Candidates(movies)),
            })
            .register(AvailabilityAgent::new(Arc::new(EmptyProvider), region.clone()));
        build_router(Arc::new(Orchestrator::new(registry, "tester", region)))
    }

    async fn post_recommend(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(RECOMMEND_ENDPOINT)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = app.oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn test_recommend_returns_movies() {
        let app = app_returning(vec![Candidate::new(268, "Batman")]);

        let (status, body) = post_recommend(app, json!({"query": "Batman"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["movies"][0]["id"], 268);
        assert_eq!(body["movies"][0]["offers"], json!([]));
    }

    #[tokio::test]
    async fn test_no_candidates_is_ok_with_no_results_status() {
        let app = app_failing_with(AgentError::NoCandidatesFound("nothing".to_string()));

        let (status, body) = post_recommend(app, json!({"query": "zzz"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "no_results");
        assert_eq!(body["movies"], json!([]));
    }

    #[tokio::test]
    async fn test_error_kinds_map_to_status_codes() {
        let cases = [
            (AgentError::InvalidIntent("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                AgentError::ProviderUnavailable {
                    status: Some(500),
                    detail: "down".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AgentError::UnknownTool("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AgentError::AgentNotFound("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let code = err.code();
            let (status, body) = post_recommend(app_failing_with(err), json!({"query": "q"})).await;
            assert_eq!(status, expected, "for {code}");
            assert_eq!(body["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn test_mistyped_body_is_bad_request_with_error_body() {
        let app = app_returning(vec![Candidate::new(268, "Batman")]);

        let (status, body) = post_recommend(app, json!({"query": "Batman", "num": "2"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["code"], "invalid_intent");
        assert!(body["error"]["message"].as_str().is_some_and(|m| m.contains("num")));
    }

    #[tokio::test]
    async fn test_unparseable_json_is_bad_request() {
        let app = app_returning(Vec::new());
        let request = Request::builder()
            .method("POST")
            .uri(RECOMMEND_ENDPOINT)
            .header("content-type", "application/json")
            .body(Body::from("{\"query\": "))
            .expect("request");

        let response = app.oneshot(request).await.expect("router response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["error"]["code"], "invalid_intent");
    }

    #[tokio::test]
    async fn test_where_to_watch_with_non_numeric_movie_id_is_bad_request() {
        let app = app_returning(Vec::new());
        let request = Request::builder()
            .method("GET")
            .uri(format!("{WHERE_TO_WATCH_ENDPOINT}?movie_id=abc"))
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("router response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["error"]["code"], "invalid_intent");
    }

    #[tokio::test]
    async fn test_where_to_watch_accepts_query_params() {
        let app = app_returning(Vec::new());
        let request = Request::builder()
            .method("GET")
            .uri(format!("{WHERE_TO_WATCH_ENDPOINT}?movie_id=550&region=gb"))
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["movie_id"], 550);
        assert_eq!(body["region"], "GB");
        assert_eq!(body["offers"], json!([]));
    }

    #[tokio::test]
    async fn test_health_lists_agents() {
        let app = app_returning(Vec::new());
        let request = Request::builder()
            .uri(HEALTH_ENDPOINT)
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "ready");
        assert_eq!(body["agents"].as_array().map(Vec::len), Some(3));
    }
}
