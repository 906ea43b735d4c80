//! Mock implementations for testing.

use std::sync::Arc;

use async_trait::async_trait;
use crawl::{CrawlFetcher, DiscoveryProvider, FetchedJob};
use hub_core::{Error, Result};
use parking_lot::Mutex;

/// Discovery provider returning a configured URL list.
///
/// Implements the same trait the production worker bridge does, so tests
/// drive the real crawl actors without any connected workers.
#[derive(Clone)]
pub struct MockDiscovery {
    urls: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockDiscovery {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls: Arc::new(Mutex::new(urls)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_urls(&self, urls: Vec<String>) {
        *self.urls.lock() = urls;
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

#[async_trait]
impl DiscoveryProvider for MockDiscovery {
    async fn discover(&self, _base_url: &str, _search_terms: &[String]) -> Result<Vec<String>> {
        if *self.should_fail.lock() {
            return Err(Error::internal("discovery provider unavailable"));
        }
        Ok(self.urls.lock().clone())
    }
}

/// Fetcher that records every requested batch and fabricates one posting
/// per URL, each on its own domain derived from the URL.
#[derive(Clone)]
pub struct MockFetcher {
    batches: Arc<Mutex<Vec<Vec<String>>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().clone()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrawlFetcher for MockFetcher {
    async fn fetch_jobs(&self, urls: &[String]) -> Result<Vec<FetchedJob>> {
        if *self.should_fail.lock() {
            return Err(Error::internal("fetcher unavailable"));
        }
        self.batches.lock().push(urls.to_vec());
        Ok(urls
            .iter()
            .map(|url| FetchedJob {
                url: url.clone(),
                company_name: None,
                website: None,
                html: Some(format!(
                    "<html><body><h1>Engineer</h1><p>Health insurance and 401k. Posting at {}</p></body></html>",
                    url
                )),
                text: None,
            })
            .collect())
    }
}
