//! Operational limits and timing defaults.
//!
//! Centralized here so the hub, crawl actors, and API agree on one set of
//! numbers. All durations are overridable through configuration.

use std::time::Duration;

/// Maximum URLs accepted in a single job submission.
pub const MAX_SUBMISSION_URLS: usize = 500;

/// Default crawl batch size when the caller omits `batch_size`.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pending commands older than this are released by the sweep and their
/// issuer notified with a CommandTimeout error.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval between hub sweep ticks (pending-command expiry and dead-peer
/// eviction).
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Connections with no heartbeat for this long are evicted by the sweep.
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum buffered outbound messages per connection before sends are
/// treated as failed and the connection evicted.
pub const CONNECTION_SEND_BUFFER: usize = 256;
