//! Job posting ingestion: company upsert + deduplicated content snapshots.

pub mod extract;
pub mod pipeline;
pub mod resolve;

pub use extract::{html_to_text, normalize_whitespace, BenefitsExtractor, Extraction, KeywordExtractor};
pub use pipeline::{IngestOutcome, IngestPipeline};
