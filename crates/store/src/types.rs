//! Persisted record shapes owned by the store adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Crawl lifecycle states. `Discovering` is recorded until the first crawl
/// batch advances progress; `Completed` is terminal until a new discovery
/// request replaces the URL list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Idle,
    Discovering,
    Crawling,
    Completed,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Crawling => "crawling",
            Self::Completed => "completed",
        }
    }
}

/// Per-site persisted crawl state.
///
/// Never deleted; a new discovery request replaces the URL list and resets
/// progress. `crawled_count` is monotonically non-decreasing between
/// discoveries and never exceeds `discovered_urls.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStateRecord {
    pub site_id: String,
    pub base_url: String,
    pub status: CrawlStatus,
    pub discovered_urls: Vec<String>,
    pub crawled_count: usize,
    pub last_activity: DateTime<Utc>,
}

impl CrawlStateRecord {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            base_url: String::new(),
            status: CrawlStatus::Idle,
            discovered_urls: Vec::new(),
            crawled_count: 0,
            last_activity: Utc::now(),
        }
    }

    pub fn total_discovered(&self) -> usize {
        self.discovered_urls.len()
    }

    pub fn remaining(&self) -> usize {
        self.total_discovered().saturating_sub(self.crawled_count)
    }

    pub fn is_complete(&self) -> bool {
        self.crawled_count >= self.total_discovered()
    }
}

/// Outcome recorded against an email-to-job link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Completed,
    Failed,
}

/// One row of the email-to-job linking table, keyed by (source id, url).
/// Keeps the originating email trace consistent even though email ingestion
/// itself lives outside this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailLinkRecord {
    pub source_id: String,
    pub url: String,
    pub status: LinkStatus,
    /// Company/job reference on success, error string on failure.
    pub reference: Option<String>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}
