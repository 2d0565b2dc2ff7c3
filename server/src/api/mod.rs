//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{auth::AuthPipeline, config::Config, webhooks, webhooks::dispatch::Dispatcher};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Webhook authentication pipeline
    pub pipeline: Arc<AuthPipeline>,
    /// Routes authenticated events to business actions
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, pipeline: AuthPipeline, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let max_payload_size = state.config.max_payload_size;
    let request_timeout = state.config.request_timeout;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // GitHub webhook deliveries
        .route("/event_handler", post(webhooks::handlers::event_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        // Deadline for handling a whole delivery
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(DefaultBodyLimit::max(max_payload_size))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
