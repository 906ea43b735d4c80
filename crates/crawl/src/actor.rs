//! The per-site crawl actor.
//!
//! One task per site id, fed by an mpsc inbox; all state mutation happens
//! inside the task, so operations against one site are serialized in
//! arrival order. Progress is persisted through the crawl-state store
//! after every mutation, making the actor resumable across restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use hub_core::{CrawlErrorCode, Error, JobUrlSubmission, Result, SubmissionSummary};
use ingest::IngestPipeline;
use job_store::{CrawlStateRecord, CrawlStateStore, CrawlStatus, EmailLinkStore, LinkStatus};
use telemetry::metrics;

use crate::fetch::{CrawlFetcher, DiscoveryProvider};

/// Response to a start-discovery request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub site_id: String,
    pub discovered_count: usize,
    pub status: CrawlStatus,
}

/// Pure read of the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub site_id: String,
    pub status: CrawlStatus,
    pub total_discovered: usize,
    pub crawled_count: usize,
    pub last_activity: DateTime<Utc>,
}

/// Response to a crawl-batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub crawled_in_batch: usize,
    pub total_crawled: usize,
    pub total_discovered: usize,
    pub status: CrawlStatus,
}

/// Inbox messages. Every variant carries a reply channel; dropping the
/// reply (caller went away) is harmless.
enum CrawlMsg {
    StartDiscovery {
        base_url: String,
        search_terms: Vec<String>,
        reply: oneshot::Sender<Result<DiscoveryResponse>>,
    },
    CrawlBatch {
        batch_size: usize,
        reply: oneshot::Sender<Result<BatchResponse>>,
    },
    ProcessJobUrls {
        submission: JobUrlSubmission,
        reply: oneshot::Sender<Result<SubmissionSummary>>,
    },
    GetStatus {
        reply: oneshot::Sender<StatusResponse>,
    },
}

/// Cloneable handle to a crawl actor.
#[derive(Clone)]
pub struct CrawlHandle {
    tx: mpsc::Sender<CrawlMsg>,
}

impl CrawlHandle {
    pub async fn start_discovery(
        &self,
        base_url: String,
        search_terms: Vec<String>,
    ) -> Result<DiscoveryResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CrawlMsg::StartDiscovery {
                base_url,
                search_terms,
                reply,
            })
            .await
            .map_err(|_| Error::internal("crawl actor stopped"))?;
        rx.await.map_err(|_| Error::internal("crawl actor dropped reply"))?
    }

    pub async fn crawl_batch(&self, batch_size: usize) -> Result<BatchResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CrawlMsg::CrawlBatch { batch_size, reply })
            .await
            .map_err(|_| Error::internal("crawl actor stopped"))?;
        rx.await.map_err(|_| Error::internal("crawl actor dropped reply"))?
    }

    pub async fn process_job_urls(
        &self,
        submission: JobUrlSubmission,
    ) -> Result<SubmissionSummary> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CrawlMsg::ProcessJobUrls { submission, reply })
            .await
            .map_err(|_| Error::internal("crawl actor stopped"))?;
        rx.await.map_err(|_| Error::internal("crawl actor dropped reply"))?
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CrawlMsg::GetStatus { reply })
            .await
            .map_err(|_| Error::internal("crawl actor stopped"))?;
        rx.await.map_err(|_| Error::internal("crawl actor dropped reply"))
    }
}

/// Collaborators shared by every crawl actor.
pub struct CrawlDeps {
    pub store: Arc<dyn CrawlStateStore>,
    pub links: Arc<dyn EmailLinkStore>,
    pub pipeline: Arc<IngestPipeline>,
    pub discovery: Arc<dyn DiscoveryProvider>,
    pub fetcher: Arc<dyn CrawlFetcher>,
}

pub(crate) struct CrawlActor {
    state: CrawlStateRecord,
    deps: Arc<CrawlDeps>,
    rx: mpsc::Receiver<CrawlMsg>,
}

/// Spawn an actor for a site, resuming any persisted state.
pub(crate) fn spawn(state: CrawlStateRecord, deps: Arc<CrawlDeps>) -> CrawlHandle {
    let (tx, rx) = mpsc::channel(64);
    let site_id = state.site_id.clone();
    let actor = CrawlActor { state, deps, rx };
    tokio::spawn(actor.run());
    debug!(site_id = %site_id, "Crawl actor spawned");
    CrawlHandle { tx }
}

impl CrawlActor {
    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                CrawlMsg::StartDiscovery {
                    base_url,
                    search_terms,
                    reply,
                } => {
                    let result = self.start_discovery(base_url, search_terms).await;
                    let _ = reply.send(result);
                }
                CrawlMsg::CrawlBatch { batch_size, reply } => {
                    let result = self.crawl_batch(batch_size).await;
                    let _ = reply.send(result);
                }
                CrawlMsg::ProcessJobUrls { submission, reply } => {
                    let result = self.process_job_urls(submission).await;
                    let _ = reply.send(result);
                }
                CrawlMsg::GetStatus { reply } => {
                    let _ = reply.send(self.status());
                }
            }
        }
        debug!(site_id = %self.state.site_id, "Crawl actor stopped");
    }

    /// Replace prior discovered state and call out to the discovery
    /// provider. On provider failure the state is persisted as
    /// `discovering` with an empty list: a retry point, not auto-retried.
    async fn start_discovery(
        &mut self,
        base_url: String,
        search_terms: Vec<String>,
    ) -> Result<DiscoveryResponse> {
        metrics().discoveries_started.inc();
        info!(site_id = %self.state.site_id, base_url = %base_url, "Starting discovery");

        self.state.base_url = base_url.clone();
        self.state.discovered_urls.clear();
        self.state.crawled_count = 0;
        self.state.status = CrawlStatus::Discovering;
        self.state.last_activity = Utc::now();

        match self.deps.discovery.discover(&base_url, &search_terms).await {
            Ok(urls) => {
                info!(
                    site_id = %self.state.site_id,
                    discovered = urls.len(),
                    "Discovery finished"
                );
                self.state.discovered_urls = urls;
                self.persist().await?;
                Ok(DiscoveryResponse {
                    site_id: self.state.site_id.clone(),
                    discovered_count: self.state.total_discovered(),
                    status: self.state.status,
                })
            }
            Err(e) => {
                error!(site_id = %self.state.site_id, error = %e, "Discovery provider failed");
                self.persist().await?;
                Err(Error::crawl(
                    CrawlErrorCode::DiscoveryFailed,
                    format!("discovery failed for {}: {}", base_url, e),
                ))
            }
        }
    }

    /// Crawl the next batch of discovered URLs.
    ///
    /// Progress advances by URLs attempted, not URLs successfully parsed,
    /// so partial failures inside a batch never stall the crawl. A fetcher
    /// failure leaves persisted state untouched, so the same call is safe
    /// to retry.
    async fn crawl_batch(&mut self, batch_size: usize) -> Result<BatchResponse> {
        if batch_size == 0 {
            return Err(Error::crawl(
                CrawlErrorCode::InvalidBatchSize,
                "batch_size must be a positive integer",
            ));
        }

        if self.state.is_complete() {
            // Idempotent terminal call: no side effects.
            return Ok(BatchResponse {
                crawled_in_batch: 0,
                total_crawled: self.state.crawled_count,
                total_discovered: self.state.total_discovered(),
                status: CrawlStatus::Completed,
            });
        }

        let start = std::time::Instant::now();
        let take = batch_size.min(self.state.remaining());
        let from = self.state.crawled_count;
        let batch: Vec<String> = self.state.discovered_urls[from..from + take].to_vec();

        // Fetch before mutating anything: a failure here must leave the
        // persisted state exactly as it was.
        let jobs = self.deps.fetcher.fetch_jobs(&batch).await?;

        for job in jobs {
            let payload = job.into_payload();
            if let Err(e) = self.deps.pipeline.ingest(&payload, false).await {
                warn!(
                    site_id = %self.state.site_id,
                    url = ?payload.url,
                    error = %e,
                    "Ingestion failed for crawled posting"
                );
            }
        }

        self.state.crawled_count += take;
        self.state.status = if self.state.is_complete() {
            CrawlStatus::Completed
        } else {
            CrawlStatus::Crawling
        };
        self.state.last_activity = Utc::now();
        self.persist().await?;

        metrics().crawl_batches.inc();
        metrics().urls_crawled.inc_by(take as u64);
        metrics()
            .crawl_batch_latency_ms
            .observe(start.elapsed().as_millis() as u64);
        info!(
            site_id = %self.state.site_id,
            crawled_in_batch = take,
            total_crawled = self.state.crawled_count,
            total_discovered = self.state.total_discovered(),
            status = self.state.status.as_str(),
            "Batch crawled"
        );

        Ok(BatchResponse {
            crawled_in_batch: take,
            total_crawled: self.state.crawled_count,
            total_discovered: self.state.total_discovered(),
            status: self.state.status,
        })
    }

    /// Delegate a URL submission to the pipeline and, for email traces,
    /// mirror per-URL outcomes into the linking table.
    async fn process_job_urls(
        &mut self,
        submission: JobUrlSubmission,
    ) -> Result<SubmissionSummary> {
        submission.check()?;
        let summary = self.deps.pipeline.submit_urls(&submission).await;

        if submission.is_email_trace() {
            let source_id = submission.source_id.as_deref().unwrap_or_default();
            for result in &summary.results {
                let (status, reference, error) = if result.success {
                    (LinkStatus::Completed, result.job_id.clone(), None)
                } else {
                    (LinkStatus::Failed, None, result.error.clone())
                };
                if let Err(e) = self
                    .deps
                    .links
                    .update_link(source_id, &result.url, status, reference, error)
                    .await
                {
                    warn!(source_id = %source_id, url = %result.url, error = %e, "Failed to update email link");
                }
            }
        }

        self.state.last_activity = Utc::now();
        self.persist().await?;
        Ok(summary)
    }

    fn status(&self) -> StatusResponse {
        StatusResponse {
            site_id: self.state.site_id.clone(),
            status: self.state.status,
            total_discovered: self.state.total_discovered(),
            crawled_count: self.state.crawled_count,
            last_activity: self.state.last_activity,
        }
    }

    async fn persist(&self) -> Result<()> {
        self.deps.store.save(&self.state).await
    }
}
