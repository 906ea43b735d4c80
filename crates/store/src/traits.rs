//! Store adapter traits.
//!
//! The relational and key-value engines are external collaborators; these
//! traits are the only surface the pipeline and crawl actors see. Adapters
//! must treat a domain-conflicting company insert as re-read and merge
//! (the memory adapter does this under its write lock; a relational adapter
//! needs a UNIQUE constraint on `normalized_domain` plus conflict handling).

use async_trait::async_trait;
use hub_core::{Company, ContentSnapshot, Result};

use crate::types::{CrawlStateRecord, EmailLinkRecord, LinkStatus};

/// Tabular access to `companies`.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Exact lookup by normalized domain.
    async fn find_by_domain(&self, normalized_domain: &str) -> Result<Option<Company>>;

    /// Insert a new row. On a domain conflict the adapter merges into the
    /// existing row and returns it; the returned row is authoritative.
    async fn insert(&self, company: Company) -> Result<Company>;

    /// Persist field-level changes to an existing row.
    async fn update(&self, company: &Company) -> Result<()>;
}

/// Tabular access to `company_benefits_snapshots`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Dedup lookup on the exact key (company id, source, source URL or
    /// null, snapshot text).
    async fn find_duplicate(
        &self,
        company_id: &str,
        source: &str,
        source_url: Option<&str>,
        snapshot_text: &str,
    ) -> Result<Option<ContentSnapshot>>;

    async fn insert(&self, snapshot: ContentSnapshot) -> Result<()>;

    async fn list_for_company(&self, company_id: &str) -> Result<Vec<ContentSnapshot>>;
}

/// Key-value persistence for per-site crawl progress.
#[async_trait]
pub trait CrawlStateStore: Send + Sync {
    async fn load(&self, site_id: &str) -> Result<Option<CrawlStateRecord>>;

    async fn save(&self, state: &CrawlStateRecord) -> Result<()>;
}

/// The email-to-job linking table.
#[async_trait]
pub trait EmailLinkStore: Send + Sync {
    async fn update_link(
        &self,
        source_id: &str,
        url: &str,
        status: LinkStatus,
        reference: Option<String>,
        error: Option<String>,
    ) -> Result<()>;

    async fn links_for_source(&self, source_id: &str) -> Result<Vec<EmailLinkRecord>>;
}
