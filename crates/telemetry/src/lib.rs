//! Internal telemetry for the scrape hub.
//!
//! In-process counters and a component health registry; no external
//! metrics system.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
