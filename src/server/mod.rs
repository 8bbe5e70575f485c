//! HTTP trigger server
//!
//! A thin axum front end: one endpoint kicks off a pipeline run on a
//! background task, another serves the last completed artifact. The
//! run state is an explicit object owned by the server and updated by
//! the worker, so a stale artifact from an earlier run is never
//! misreported as the result of one still in flight.

pub mod api;

pub use api::create_router;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::models::RunReport;
use crate::pipeline::Pipeline;

/// Lifecycle of the most recent pipeline run
///
/// `idle → processing → done | failed`. Starting a new run while one is
/// in flight is allowed (no mutual exclusion); the state tracks the
/// latest kickoff and the last writer wins.
#[derive(Debug, Clone)]
pub enum RunState {
    /// No run started since the server came up
    Idle,
    /// A run is in flight
    Processing,
    /// The last run completed; artifact is on disk
    Done(RunReport),
    /// The last run failed; details in the server logs
    Failed(String),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The pipeline runner shared by all triggered runs
    pub pipeline: Arc<Pipeline>,

    /// State of the most recent run
    pub run_state: Arc<RwLock<RunState>>,

    /// Server start time
    pub start_time: Instant,
}

/// The trigger server
pub struct TriggerServer {
    config: Arc<Config>,
    state: AppState,
}

impl TriggerServer {
    /// Create a new trigger server around a pipeline
    pub fn new(config: Arc<Config>, pipeline: Arc<Pipeline>) -> Self {
        let state = AppState {
            pipeline,
            run_state: Arc::new(RwLock::new(RunState::Idle)),
            start_time: Instant::now(),
        };

        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        create_router(self.state.clone())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server and serve until terminated
    pub async fn start(&self) -> anyhow::Result<()> {
        let router = self.build_router();
        let addr = format!("0.0.0.0:{}", self.config.server.port);

        tracing::info!(addr = %addr, "Starting trigger server");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let addr = format!("0.0.0.0:{}", self.config.server.port);

        tracing::info!(addr = %addr, "Starting trigger server (with graceful shutdown)");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("Trigger server shutdown complete");
        Ok(())
    }
}
