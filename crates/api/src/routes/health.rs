//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use telemetry::{health, metrics};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub hub_healthy: bool,
    pub store_healthy: bool,
    pub active_connections: u64,
    pub pending_commands: u64,
    pub namespaces: usize,
    pub crawl_actors: usize,
}

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = health().report();

    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        hub_healthy: health().hub.is_healthy(),
        store_healthy: health().store.is_healthy(),
        active_connections: metrics().active_connections.get(),
        pending_commands: metrics().pending_commands.get(),
        namespaces: state.hubs.namespace_count(),
        crawl_actors: state.crawls.actor_count(),
    })
}

/// GET /health/ready - Readiness probe (can accept traffic).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
