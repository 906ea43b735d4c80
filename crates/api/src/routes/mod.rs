//! API routes.

pub mod crawl;
pub mod health;
pub mod socket;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/:namespace", get(socket::websocket_handler))
        .route(
            "/sites/:site_id/start-discovery",
            post(crawl::start_discovery_handler),
        )
        .route("/sites/:site_id/status", get(crawl::status_handler))
        .route("/sites/:site_id/crawl-urls", post(crawl::crawl_batch_handler))
        .route(
            "/sites/:site_id/process-job-url",
            post(crawl::process_job_urls_handler),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
