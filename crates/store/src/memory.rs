//! In-memory store adapter.
//!
//! Backs the service when no relational engine is wired in, and every test.
//! All maps sit behind `parking_lot` locks; the company map's write lock is
//! what makes the insert-conflict merge atomic.

use async_trait::async_trait;
use chrono::Utc;
use hub_core::{Company, ContentSnapshot, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use crate::traits::{CompanyStore, CrawlStateStore, EmailLinkStore, SnapshotStore};
use crate::types::{CrawlStateRecord, EmailLinkRecord, LinkStatus};

/// In-memory implementation of all four store traits.
#[derive(Default)]
pub struct MemoryStore {
    /// normalized_domain -> Company
    companies: RwLock<HashMap<String, Company>>,
    /// company_id -> snapshots
    snapshots: RwLock<HashMap<String, Vec<ContentSnapshot>>>,
    /// site_id -> crawl state
    crawl_states: RwLock<HashMap<String, CrawlStateRecord>>,
    /// (source_id, url) -> link record
    email_links: RwLock<HashMap<(String, String), EmailLinkRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total company rows (test/status surface).
    pub fn company_count(&self) -> usize {
        self.companies.read().len()
    }

    /// Total snapshot rows across companies (test/status surface).
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn find_by_domain(&self, normalized_domain: &str) -> Result<Option<Company>> {
        Ok(self.companies.read().get(normalized_domain).cloned())
    }

    async fn insert(&self, company: Company) -> Result<Company> {
        let mut companies = self.companies.write();
        // Re-check under the write lock: two actors racing the same new
        // domain must converge on one row.
        if let Some(existing) = companies.get_mut(&company.normalized_domain) {
            debug!(
                domain = %company.normalized_domain,
                "Insert hit existing company, merging"
            );
            if existing.website_url.is_none() {
                existing.website_url = company.website_url;
            }
            if existing.careers_url.is_none() {
                existing.careers_url = company.careers_url;
            }
            if existing.description.is_none() {
                existing.description = company.description;
            }
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        companies.insert(company.normalized_domain.clone(), company.clone());
        Ok(company)
    }

    async fn update(&self, company: &Company) -> Result<()> {
        self.companies
            .write()
            .insert(company.normalized_domain.clone(), company.clone());
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn find_duplicate(
        &self,
        company_id: &str,
        source: &str,
        source_url: Option<&str>,
        snapshot_text: &str,
    ) -> Result<Option<ContentSnapshot>> {
        Ok(self
            .snapshots
            .read()
            .get(company_id)
            .and_then(|rows| {
                rows.iter().find(|s| {
                    s.source == source
                        && s.source_url.as_deref() == source_url
                        && s.snapshot_text == snapshot_text
                })
            })
            .cloned())
    }

    async fn insert(&self, snapshot: ContentSnapshot) -> Result<()> {
        self.snapshots
            .write()
            .entry(snapshot.company_id.clone())
            .or_default()
            .push(snapshot);
        Ok(())
    }

    async fn list_for_company(&self, company_id: &str) -> Result<Vec<ContentSnapshot>> {
        Ok(self
            .snapshots
            .read()
            .get(company_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CrawlStateStore for MemoryStore {
    async fn load(&self, site_id: &str) -> Result<Option<CrawlStateRecord>> {
        Ok(self.crawl_states.read().get(site_id).cloned())
    }

    async fn save(&self, state: &CrawlStateRecord) -> Result<()> {
        self.crawl_states
            .write()
            .insert(state.site_id.clone(), state.clone());
        Ok(())
    }
}

#[async_trait]
impl EmailLinkStore for MemoryStore {
    async fn update_link(
        &self,
        source_id: &str,
        url: &str,
        status: LinkStatus,
        reference: Option<String>,
        error: Option<String>,
    ) -> Result<()> {
        self.email_links.write().insert(
            (source_id.to_string(), url.to_string()),
            EmailLinkRecord {
                source_id: source_id.to_string(),
                url: url.to_string(),
                status,
                reference,
                error,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn links_for_source(&self, source_id: &str) -> Result<Vec<EmailLinkRecord>> {
        Ok(self
            .email_links
            .read()
            .values()
            .filter(|l| l.source_id == source_id)
            .cloned()
            .collect())
    }
}
