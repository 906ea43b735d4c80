//! Per-site crawl state machines.
//!
//! Lifecycle: `idle -> discovering -> crawling -> completed`, with
//! `discovering` re-enterable by a new request that replaces the URL list.

pub mod actor;
pub mod fetch;
pub mod registry;

pub use actor::{BatchResponse, CrawlDeps, CrawlHandle, DiscoveryResponse, StatusResponse};
pub use fetch::{CrawlFetcher, DiscoveryProvider, FetchedJob};
pub use registry::CrawlRegistry;
