//! Application state shared across handlers.

use std::sync::Arc;

use crawl::CrawlRegistry;
use hub::HubRegistry;
use hub_core::ServiceToken;
use ingest::IngestPipeline;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Digest of the shared service token; every surface authenticates
    /// against it.
    pub token: ServiceToken,
    /// Per-namespace connection hubs.
    pub hubs: Arc<HubRegistry>,
    /// Per-site crawl actors.
    pub crawls: Arc<CrawlRegistry>,
    /// Direct pipeline access for URL submissions outside a crawl actor.
    pub pipeline: Arc<IngestPipeline>,
}

impl AppState {
    pub fn new(
        token: ServiceToken,
        hubs: Arc<HubRegistry>,
        crawls: Arc<CrawlRegistry>,
        pipeline: Arc<IngestPipeline>,
    ) -> Self {
        Self {
            token,
            hubs,
            crawls,
            pipeline,
        }
    }
}
