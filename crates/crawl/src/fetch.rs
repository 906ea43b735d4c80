//! External crawl collaborators.
//!
//! Discovery and fetching are provided by search/browser-automation
//! services outside this subsystem; the actors only see these traits.

use async_trait::async_trait;
use hub_core::{JobPayload, Result};

/// Finds candidate job-posting URLs for a site.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn discover(&self, base_url: &str, search_terms: &[String]) -> Result<Vec<String>>;
}

/// Fetches and parses job postings for a batch of URLs.
///
/// A batch-level error means nothing was fetched; per-URL parse failures
/// are expressed by omitting that URL's posting from the result.
#[async_trait]
pub trait CrawlFetcher: Send + Sync {
    async fn fetch_jobs(&self, urls: &[String]) -> Result<Vec<FetchedJob>>;
}

/// One parsed job posting returned by the fetcher.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FetchedJob {
    pub url: String,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

impl FetchedJob {
    /// Convert into an ingestion payload tagged with the crawl source.
    pub fn into_payload(self) -> JobPayload {
        JobPayload {
            url: Some(self.url),
            company_name: self.company_name,
            website: self.website,
            html: self.html,
            text: self.text,
            source: "site_crawl".to_string(),
            ..Default::default()
        }
    }
}
