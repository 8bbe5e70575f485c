//! HTTP handlers for the trigger server
//!
//! - `GET /run_trends` starts a pipeline run asynchronously and returns
//!   a status payload immediately.
//! - `GET /get_results` returns the artifact body once a run has
//!   completed, a `pending` stub otherwise.
//! - `GET /health` reports server liveness.
//!
//! Internal errors never surface to the caller; failures are observable
//! through the server logs and the `failed` run state.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{AppState, RunState};

/// Status payload returned by the trigger and result endpoints
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/run_trends", get(run_trends))
        .route("/get_results", get(get_results))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Kick off a pipeline run on a background task
///
/// Returns immediately; overlapping runs are not mutually excluded and
/// the run state tracks the most recent kickoff.
async fn run_trends(State(state): State<AppState>) -> Json<StatusResponse> {
    {
        let mut run_state = state.run_state.write().await;
        *run_state = RunState::Processing;
    }

    let pipeline = state.pipeline.clone();
    let slot = state.run_state.clone();
    tokio::spawn(async move {
        match pipeline.run().await {
            Ok(report) => {
                tracing::info!(
                    ranked = report.ranked_count,
                    artifact = %report.artifact_path.display(),
                    "Triggered run completed"
                );
                *slot.write().await = RunState::Done(report);
            }
            Err(e) => {
                tracing::error!(error = %e, "Triggered run failed");
                *slot.write().await = RunState::Failed(e.to_string());
            }
        }
    });

    Json(StatusResponse::new(
        "processing",
        "Trend pipeline run started",
    ))
}

/// Serve the artifact of the last completed run
async fn get_results(State(state): State<AppState>) -> Response {
    let run_state = state.run_state.read().await.clone();

    match run_state {
        RunState::Done(report) => match tokio::fs::read(&report.artifact_path).await {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::warn!(error = %e, "Artifact missing despite completed run");
                Json(StatusResponse::new("pending", "Artifact not available")).into_response()
            }
        },
        RunState::Failed(_) => {
            Json(StatusResponse::new("failed", "Last run failed, see server logs"))
                .into_response()
        }
        RunState::Processing => {
            Json(StatusResponse::new("pending", "A run is in progress")).into_response()
        }
        RunState::Idle => {
            Json(StatusResponse::new("pending", "No run started yet")).into_response()
        }
    }
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("healthy"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::embedding::{FastScorer, SemanticScorer, TextEncoder};
    use crate::pipeline::Pipeline;
    use crate::server::TriggerServer;
    use crate::trends::TrendsClient;
    use std::sync::Arc;
    use std::time::Duration;

    struct ZeroEncoder;

    impl TextEncoder for ZeroEncoder {
        fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn test_server(artifact_dir: &std::path::Path) -> TriggerServer {
        let mut config = Config::default();
        config.trends.api_key = String::from("test-key");
        config.trends.geo_list = vec![String::from("US")];
        config.export.output_path = artifact_dir.join("top.json");
        let config = Arc::new(config);

        // Nothing listens on port 9; every fetch recovers to empty
        let client = Arc::new(
            TrendsClient::with_base_url(&config.trends, "http://127.0.0.1:9").unwrap(),
        );
        let scorer = SemanticScorer::new(Arc::new(ZeroEncoder)).unwrap();
        let pipeline = Arc::new(Pipeline::new(
            config.clone(),
            client,
            Arc::new(FastScorer::new(scorer)),
            None,
        ));

        TriggerServer::new(config, pipeline)
    }

    #[tokio::test]
    async fn test_get_results_pending_before_any_run() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path());

        let response = get_results(State(server.state())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "pending");
    }

    #[tokio::test]
    async fn test_run_trends_returns_processing_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path());

        let response = run_trends(State(server.state())).await;
        assert_eq!(response.0.status, "processing");
    }

    #[tokio::test]
    async fn test_triggered_run_reaches_done_and_serves_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path());
        let state = server.state();

        run_trends(State(state.clone())).await;

        // All regions fail to fetch, so the run completes with an empty list
        for _ in 0..100 {
            if !matches!(*state.run_state.read().await, RunState::Processing) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(matches!(*state.run_state.read().await, RunState::Done(_)));

        let response = get_results(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path());

        let response = health_check(State(server.state())).await;
        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.version, env!("CARGO_PKG_VERSION"));
    }
}
