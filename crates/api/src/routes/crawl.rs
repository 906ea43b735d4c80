//! Crawl control endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use crawl::{BatchResponse, DiscoveryResponse, StatusResponse};
use hub_core::limits::DEFAULT_BATCH_SIZE;
use hub_core::{JobUrlSubmission, SubmissionSummary};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::extractors::AuthContext;
use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct DiscoveryRequest {
    #[validate(url)]
    pub base_url: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CrawlBatchRequest {
    pub batch_size: Option<usize>,
}

/// POST /sites/:site_id/start-discovery
pub async fn start_discovery_handler(
    _auth: AuthContext,
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(body): Json<DiscoveryRequest>,
) -> Result<Json<DiscoveryResponse>, ApiError> {
    body.validate()?;
    info!(site = %site_id, base_url = %body.base_url, "starting discovery");

    let handle = state.crawls.handle(&site_id).await?;
    let response = handle
        .start_discovery(body.base_url, body.search_terms)
        .await?;
    Ok(Json(response))
}

/// GET /sites/:site_id/status
pub async fn status_handler(
    _auth: AuthContext,
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let handle = state.crawls.handle(&site_id).await?;
    Ok(Json(handle.status().await?))
}

/// POST /sites/:site_id/crawl-urls
pub async fn crawl_batch_handler(
    _auth: AuthContext,
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(body): Json<CrawlBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch_size = body.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    let handle = state.crawls.handle(&site_id).await?;
    Ok(Json(handle.crawl_batch(batch_size).await?))
}

/// POST /sites/:site_id/process-job-url
pub async fn process_job_urls_handler(
    _auth: AuthContext,
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(submission): Json<JobUrlSubmission>,
) -> Result<Json<SubmissionSummary>, ApiError> {
    submission.check()?;
    info!(
        site = %site_id,
        urls = submission.urls.len(),
        source = %submission.source,
        "processing job urls"
    );
    let handle = state.crawls.handle(&site_id).await?;
    Ok(Json(handle.process_job_urls(submission).await?))
}
