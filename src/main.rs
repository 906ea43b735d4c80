//! Scrape coordination hub.
//!
//! Real-time coordination service for a job-posting platform:
//! - WebSocket hub relaying scrape commands to workers, with correlated
//!   replies and observer fan-out
//! - Per-site crawl state machine driving batched URL crawling
//! - Ingestion pipeline deduplicating companies and content snapshots

mod scrape;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use crawl::{CrawlDeps, CrawlRegistry};
use hub::HubRegistry;
use hub_core::ServiceToken;
use ingest::{IngestPipeline, KeywordExtractor};
use job_store::MemoryStore;
use scrape::WorkerScraper;
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Shared service token every client presents.
    #[serde(default)]
    service_token: String,

    /// Namespace whose workers serve crawl discovery and fetching.
    #[serde(default = "default_crawl_namespace")]
    crawl_namespace: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_crawl_namespace() -> String {
    "scrape".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_token: String::new(),
            crawl_namespace: default_crawl_namespace(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting scrape hub v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    if config.service_token.is_empty() {
        anyhow::bail!("SCRAPEHUB_SERVICE_TOKEN must be set");
    }

    // The bundled adapter keeps everything in process; swapping in a
    // relational adapter only changes this wiring.
    let store = Arc::new(MemoryStore::new());
    health().store.set_healthy();

    let pipeline = Arc::new(IngestPipeline::new(
        store.clone(),
        store.clone(),
        Arc::new(KeywordExtractor),
    ));

    let hubs = Arc::new(HubRegistry::new(pipeline.clone()));
    health().hub.set_healthy();

    // Crawl actors delegate all network work to the scrape namespace's
    // connected workers.
    let scraper = WorkerScraper::connect(hubs.handle(&config.crawl_namespace))
        .await
        .context("Failed to connect scraper bridge")?;
    let crawls = Arc::new(CrawlRegistry::new(CrawlDeps {
        store: store.clone(),
        links: store.clone(),
        pipeline: pipeline.clone(),
        discovery: scraper.clone(),
        fetcher: scraper,
    }));

    let state = AppState::new(
        ServiceToken::new(&config.service_token),
        hubs,
        crawls,
        pipeline,
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("SCRAPEHUB")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
