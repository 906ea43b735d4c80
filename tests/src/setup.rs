//! Common test setup functions.

use std::sync::Arc;

use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use crawl::{CrawlDeps, CrawlRegistry};
use hub::HubRegistry;
use hub_core::ServiceToken;
use ingest::{IngestPipeline, KeywordExtractor};
use job_store::MemoryStore;
use telemetry::health;

use crate::mocks::{MockDiscovery, MockFetcher};

/// Token every test request authenticates with.
pub const TEST_TOKEN: &str = "test-service-token";

/// Test context driving the real router.
///
/// Same production code paths: real axum router with all layers, real
/// actors and pipeline, the bundled in-memory store, and mock crawl
/// collaborators in place of connected scrape workers.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub discovery: MockDiscovery,
    pub fetcher: MockFetcher,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_discovered_urls(Vec::new())
    }

    /// Context whose discovery provider returns the given URLs.
    pub fn with_discovered_urls(urls: Vec<String>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(IngestPipeline::new(
            store.clone(),
            store.clone(),
            Arc::new(KeywordExtractor),
        ));
        let hubs = Arc::new(HubRegistry::new(pipeline.clone()));
        let discovery = MockDiscovery::new(urls);
        let fetcher = MockFetcher::new();
        let crawls = Arc::new(CrawlRegistry::new(CrawlDeps {
            store: store.clone(),
            links: store.clone(),
            pipeline: pipeline.clone(),
            discovery: Arc::new(discovery.clone()),
            fetcher: Arc::new(fetcher.clone()),
        }));

        health().hub.set_healthy();
        health().store.set_healthy();

        let state = AppState::new(ServiceToken::new(TEST_TOKEN), hubs, crawls, pipeline);
        let router = router(state);

        Self {
            store,
            discovery,
            fetcher,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
