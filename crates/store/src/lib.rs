//! Store adapters for the scrape hub.
//!
//! Companies and content snapshots live in a tabular store; crawl progress
//! in a key-value store. Both engines are external collaborators reached
//! through the traits here. The bundled [`MemoryStore`] implements all of
//! them for local runs and tests.

pub mod memory;
pub mod traits;
pub mod types;

pub use memory::MemoryStore;
pub use traits::{CompanyStore, CrawlStateStore, EmailLinkStore, SnapshotStore};
pub use types::{CrawlStateRecord, CrawlStatus, EmailLinkRecord, LinkStatus};
