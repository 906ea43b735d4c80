//! The ingestion pipeline: one job-posting payload in, a deduplicated
//! Company + ContentSnapshot pair out.
//!
//! Failures local to one URL never abort sibling work; the batch entry
//! point converts every error into a per-URL result.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use hub_core::{Company, ContentSnapshot, JobPayload, JobUrlSubmission, Result, SubmissionSummary, UrlResult};
use job_store::{CompanyStore, SnapshotStore};
use telemetry::metrics;

use crate::extract::{html_to_text, BenefitsExtractor};
use crate::resolve::{resolve_domain, resolve_name, resolve_website};

/// Cache TTL for domain -> company lookups.
const COMPANY_CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum cached companies.
const COMPANY_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Source tag used when a payload carries none.
const DEFAULT_SOURCE: &str = "job_posting";

/// Outcome of ingesting one payload.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    /// Resolved company id; `None` means the payload was skipped
    /// ("no company resolved").
    pub company_id: Option<String>,
    /// Newly inserted snapshot id; `None` on skip, dedup, empty text, or
    /// dry run.
    pub snapshot_id: Option<String>,
    /// Whether an identical snapshot already existed.
    pub deduped: bool,
}

impl IngestOutcome {
    /// The reference recorded against the originating trace: the snapshot
    /// when one was created, else the company.
    pub fn job_ref(&self) -> Option<String> {
        self.snapshot_id.clone().or_else(|| self.company_id.clone())
    }
}

/// The ingestion pipeline. Shared across actors; the store is the only
/// cross-actor mutable resource.
pub struct IngestPipeline {
    companies: Arc<dyn CompanyStore>,
    snapshots: Arc<dyn SnapshotStore>,
    extractor: Arc<dyn BenefitsExtractor>,
    /// Read-through cache on normalized domain, invalidated on writes.
    company_cache: Cache<String, Company>,
}

impl IngestPipeline {
    pub fn new(
        companies: Arc<dyn CompanyStore>,
        snapshots: Arc<dyn SnapshotStore>,
        extractor: Arc<dyn BenefitsExtractor>,
    ) -> Self {
        Self {
            companies,
            snapshots,
            extractor,
            company_cache: Cache::builder()
                .max_capacity(COMPANY_CACHE_MAX_CAPACITY)
                .time_to_live(COMPANY_CACHE_TTL)
                .build(),
        }
    }

    /// Resolve or create the company for a payload.
    ///
    /// Returns `Ok(None)` when no domain can be computed: a recorded skip,
    /// not an error.
    pub async fn upsert_company(&self, payload: &JobPayload) -> Result<Option<Company>> {
        let Some(domain) = resolve_domain(payload) else {
            metrics().company_skips.inc();
            debug!(url = ?payload.url, "No company domain resolvable, skipping");
            return Ok(None);
        };

        let existing = match self.company_cache.get(&domain).await {
            Some(cached) => Some(cached),
            None => self.companies.find_by_domain(&domain).await?,
        };

        let company = match existing {
            Some(mut company) => {
                if merge_company_fields(&mut company, payload) {
                    company.updated_at = chrono::Utc::now();
                    self.companies.update(&company).await?;
                    metrics().companies_merged.inc();
                    debug!(domain = %domain, company_id = %company.id, "Merged company fields");
                }
                company
            }
            None => {
                let mut company = Company::new(domain.clone(), resolve_name(payload));
                company.website_url = resolve_website(payload);
                company.careers_url = payload
                    .careers_url
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                company.description = payload
                    .text
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                // The adapter merges on a domain conflict, so the returned
                // row is authoritative even if another actor raced us.
                let company = self.companies.insert(company).await?;
                metrics().companies_created.inc();
                info!(domain = %domain, company_id = %company.id, "Created company");
                company
            }
        };

        self.company_cache.insert(domain, company.clone()).await;
        Ok(Some(company))
    }

    /// Ingest one payload: resolve the company, extract a snapshot,
    /// deduplicate, persist.
    ///
    /// `dry_run` performs everything except the snapshot insert.
    pub async fn ingest(&self, payload: &JobPayload, dry_run: bool) -> Result<IngestOutcome> {
        let start = std::time::Instant::now();

        let Some(company) = self.upsert_company(payload).await? else {
            return Ok(IngestOutcome::default());
        };

        let mut outcome = IngestOutcome {
            company_id: Some(company.id.clone()),
            ..Default::default()
        };

        let text = match (&payload.html, &payload.text) {
            (Some(html), _) if !html.is_empty() => html_to_text(html),
            (_, Some(text)) => text.clone(),
            _ => String::new(),
        };
        if text.trim().is_empty() {
            debug!(company_id = %company.id, "No text to extract, company resolution only");
            return Ok(outcome);
        }

        let extraction = self.extractor.extract(&text).await?;
        if extraction.snapshot_text.is_empty() {
            return Ok(outcome);
        }

        let source = if payload.source.is_empty() {
            DEFAULT_SOURCE
        } else {
            payload.source.as_str()
        };
        let source_url = payload.url.as_deref();

        if let Some(existing) = self
            .snapshots
            .find_duplicate(&company.id, source, source_url, &extraction.snapshot_text)
            .await?
        {
            metrics().snapshots_deduped.inc();
            debug!(
                company_id = %company.id,
                snapshot_id = %existing.id,
                "Identical snapshot exists, skipping insert"
            );
            outcome.deduped = true;
            return Ok(outcome);
        }

        if dry_run {
            debug!(company_id = %company.id, "Dry run, suppressing snapshot insert");
            return Ok(outcome);
        }

        let snapshot = ContentSnapshot::new(
            company.id.clone(),
            source,
            source_url.map(str::to_string),
            extraction.snapshot_text,
            extraction.parsed,
        );
        let snapshot_id = snapshot.id.clone();
        self.snapshots.insert(snapshot).await?;
        metrics().snapshots_created.inc();
        metrics()
            .ingest_latency_ms
            .observe(start.elapsed().as_millis() as u64);
        info!(company_id = %company.id, snapshot_id = %snapshot_id, source = %source, "Snapshot stored");

        outcome.snapshot_id = Some(snapshot_id);
        Ok(outcome)
    }

    /// Batch submission entry point: one result per URL, failures captured
    /// per-URL, nothing propagates to the caller.
    pub async fn submit_urls(&self, submission: &JobUrlSubmission) -> SubmissionSummary {
        metrics().urls_submitted.inc_by(submission.urls.len() as u64);

        let mut results = Vec::with_capacity(submission.urls.len());
        for url in &submission.urls {
            let payload = JobPayload::from_submission_url(url, submission);
            let result = match self.ingest(&payload, false).await {
                Ok(outcome) if outcome.company_id.is_some() => {
                    UrlResult::ok(url, outcome.job_ref())
                }
                Ok(_) => UrlResult::failed(url, "no company resolved"),
                Err(e) => {
                    warn!(url = %url, error = %e, "Ingestion failed for URL");
                    UrlResult::failed(url, e.to_string())
                }
            };
            results.push(result);
        }

        let summary = SubmissionSummary::from_results(results);
        metrics().urls_failed.inc_by(summary.failed_count as u64);
        info!(
            source = %submission.source,
            processed = summary.processed_count,
            failed = summary.failed_count,
            "Submission processed"
        );
        summary
    }
}

/// Field-level merge: overwrite name/website/careers only with a non-empty
/// value that differs; overwrite description only with a strictly longer
/// one. Returns whether anything changed.
fn merge_company_fields(company: &mut Company, payload: &JobPayload) -> bool {
    let mut changed = false;

    if let Some(name) = resolve_name(payload) {
        if name != company.name {
            company.name = name;
            changed = true;
        }
    }

    if let Some(website) = resolve_website(payload) {
        if company.website_url.as_deref() != Some(website.as_str()) {
            company.website_url = Some(website);
            changed = true;
        }
    }

    if let Some(careers) = payload.careers_url.as_deref().filter(|v| !v.is_empty()) {
        if company.careers_url.as_deref() != Some(careers) {
            company.careers_url = Some(careers.to_string());
            changed = true;
        }
    }

    if let Some(description) = payload.text.as_deref().filter(|v| !v.is_empty()) {
        let stored_len = company.description.as_deref().map_or(0, str::len);
        if description.len() > stored_len {
            company.description = Some(description.to_string());
            changed = true;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::KeywordExtractor;
    use job_store::MemoryStore;

    fn pipeline_with_store() -> (IngestPipeline, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::new(
            store.clone(),
            store.clone(),
            Arc::new(KeywordExtractor),
        );
        (pipeline, store)
    }

    fn posting(url: &str, text: &str) -> JobPayload {
        JobPayload {
            url: Some(url.to_string()),
            text: Some(text.to_string()),
            source: "job_posting".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_idempotent_company_upsert() {
        let (pipeline, store) = pipeline_with_store();
        let payload = posting("https://acme.com/jobs/1", "health dental 401k");

        let first = pipeline.upsert_company(&payload).await.unwrap().unwrap();
        let second = pipeline.upsert_company(&payload).await.unwrap().unwrap();

        assert_eq!(store.company_count(), 1);
        assert_eq!(first.id, second.id);
        // Nothing differed, so the second call performed zero writes
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_no_domain_is_recorded_skip() {
        let (pipeline, store) = pipeline_with_store();
        let outcome = pipeline
            .ingest(&JobPayload::default(), false)
            .await
            .unwrap();
        assert!(outcome.company_id.is_none());
        assert_eq!(store.company_count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_dedup() {
        let (pipeline, store) = pipeline_with_store();
        let payload = posting("https://acme.com/jobs/1", "health dental 401k");

        let first = pipeline.ingest(&payload, false).await.unwrap();
        assert!(first.snapshot_id.is_some());
        assert!(!first.deduped);

        let second = pipeline.ingest(&payload, false).await.unwrap();
        assert!(second.snapshot_id.is_none());
        assert!(second.deduped);
        assert_eq!(store.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_differences_dedup() {
        let (pipeline, store) = pipeline_with_store();
        let first = posting("https://acme.com/jobs/1", "health  dental\n401k");
        let second = posting("https://acme.com/jobs/1", "health dental 401k");

        pipeline.ingest(&first, false).await.unwrap();
        let outcome = pipeline.ingest(&second, false).await.unwrap();
        assert!(outcome.deduped);
        assert_eq!(store.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_suppresses_insert() {
        let (pipeline, store) = pipeline_with_store();
        let payload = posting("https://acme.com/jobs/1", "health dental 401k");

        let outcome = pipeline.ingest(&payload, true).await.unwrap();
        assert!(outcome.company_id.is_some());
        assert!(outcome.snapshot_id.is_none());
        // Company resolution still happened
        assert_eq!(store.company_count(), 1);
        assert_eq!(store.snapshot_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_stops_after_company() {
        let (pipeline, store) = pipeline_with_store();
        let payload = JobPayload {
            url: Some("https://acme.com/jobs/1".into()),
            ..Default::default()
        };
        let outcome = pipeline.ingest(&payload, false).await.unwrap();
        assert!(outcome.company_id.is_some());
        assert!(outcome.snapshot_id.is_none());
        assert_eq!(store.snapshot_count(), 0);
    }

    #[tokio::test]
    async fn test_same_domain_merges_one_company() {
        let (pipeline, store) = pipeline_with_store();

        let careers = JobPayload {
            website: Some("https://acme.com/careers".into()),
            text: Some("short".into()),
            ..Default::default()
        };
        let job = JobPayload {
            url: Some("https://acme.com/jobs/1".into()),
            text: Some("a much longer description of the role".into()),
            ..Default::default()
        };

        let first = pipeline.upsert_company(&careers).await.unwrap().unwrap();
        let second = pipeline.upsert_company(&job).await.unwrap().unwrap();

        assert_eq!(store.company_count(), 1);
        assert_eq!(first.id, second.id);
        // Longer description won
        assert_eq!(
            second.description.as_deref(),
            Some("a much longer description of the role")
        );
    }

    #[tokio::test]
    async fn test_description_never_shrinks() {
        let (pipeline, _store) = pipeline_with_store();

        let long = JobPayload {
            url: Some("https://acme.com/jobs/1".into()),
            text: Some("a much longer description of the role".into()),
            ..Default::default()
        };
        let short = JobPayload {
            url: Some("https://acme.com/jobs/2".into()),
            text: Some("short".into()),
            ..Default::default()
        };

        pipeline.upsert_company(&long).await.unwrap();
        let merged = pipeline.upsert_company(&short).await.unwrap().unwrap();
        assert_eq!(
            merged.description.as_deref(),
            Some("a much longer description of the role")
        );
    }

    #[tokio::test]
    async fn test_partial_batch_resilience() {
        let (pipeline, _store) = pipeline_with_store();
        let submission = JobUrlSubmission::new(
            vec![
                "https://acme.com/jobs/1".into(),
                "not a url".into(),
                "https://globex.com/jobs/2".into(),
            ],
            "scrape",
        );

        let summary = pipeline.submit_urls(&submission).await;
        assert!(summary.success);
        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(
            summary.processed_count + summary.failed_count,
            submission.urls.len()
        );
        let failed = summary.results.iter().find(|r| !r.success).unwrap();
        assert_eq!(failed.url, "not a url");
        assert_eq!(failed.error.as_deref(), Some("no company resolved"));
    }
}
