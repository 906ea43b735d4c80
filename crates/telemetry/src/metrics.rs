//! Internal metrics collection.
//!
//! Counters and latency histograms kept in-process; snapshots are exposed
//! through the health/status surface rather than an external metrics system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the scrape hub.
#[derive(Debug, Default)]
pub struct Metrics {
    // Connection hub metrics
    pub connections_registered: Counter,
    pub connections_evicted: Counter,
    pub commands_dispatched: Counter,
    pub replies_matched: Counter,
    pub replies_dropped: Counter,
    pub commands_timed_out: Counter,
    pub broadcasts_sent: Counter,
    pub malformed_messages: Counter,

    // Crawl metrics
    pub discoveries_started: Counter,
    pub crawl_batches: Counter,
    pub urls_crawled: Counter,

    // Ingestion metrics
    pub urls_submitted: Counter,
    pub urls_failed: Counter,
    pub companies_created: Counter,
    pub companies_merged: Counter,
    pub company_skips: Counter,
    pub snapshots_created: Counter,
    pub snapshots_deduped: Counter,

    // Latency histograms
    pub ingest_latency_ms: Histogram,
    pub dispatch_latency_ms: Histogram,
    pub crawl_batch_latency_ms: Histogram,

    // Gauges
    pub active_connections: Gauge,
    pub active_workers: Gauge,
    pub pending_commands: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub connections_registered: u64,
    pub connections_evicted: u64,
    pub commands_dispatched: u64,
    pub replies_matched: u64,
    pub replies_dropped: u64,
    pub commands_timed_out: u64,
    pub broadcasts_sent: u64,
    pub malformed_messages: u64,
    pub discoveries_started: u64,
    pub crawl_batches: u64,
    pub urls_crawled: u64,
    pub urls_submitted: u64,
    pub urls_failed: u64,
    pub companies_created: u64,
    pub companies_merged: u64,
    pub company_skips: u64,
    pub snapshots_created: u64,
    pub snapshots_deduped: u64,
    pub ingest_latency_mean_ms: f64,
    pub dispatch_latency_mean_ms: f64,
    pub crawl_batch_latency_mean_ms: f64,
    pub active_connections: u64,
    pub active_workers: u64,
    pub pending_commands: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            connections_registered: self.connections_registered.get(),
            connections_evicted: self.connections_evicted.get(),
            commands_dispatched: self.commands_dispatched.get(),
            replies_matched: self.replies_matched.get(),
            replies_dropped: self.replies_dropped.get(),
            commands_timed_out: self.commands_timed_out.get(),
            broadcasts_sent: self.broadcasts_sent.get(),
            malformed_messages: self.malformed_messages.get(),
            discoveries_started: self.discoveries_started.get(),
            crawl_batches: self.crawl_batches.get(),
            urls_crawled: self.urls_crawled.get(),
            urls_submitted: self.urls_submitted.get(),
            urls_failed: self.urls_failed.get(),
            companies_created: self.companies_created.get(),
            companies_merged: self.companies_merged.get(),
            company_skips: self.company_skips.get(),
            snapshots_created: self.snapshots_created.get(),
            snapshots_deduped: self.snapshots_deduped.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            dispatch_latency_mean_ms: self.dispatch_latency_ms.mean(),
            crawl_batch_latency_mean_ms: self.crawl_batch_latency_ms.mean(),
            active_connections: self.active_connections.get(),
            active_workers: self.active_workers.get(),
            pending_commands: self.pending_commands.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let c = Counter::new();
        c.inc();
        c.inc_by(4);
        assert_eq!(c.get(), 5);
        assert_eq!(c.reset(), 5);
        assert_eq!(c.get(), 0);
    }

    #[test]
    fn test_histogram_mean() {
        let h = Histogram::new();
        assert_eq!(h.mean(), 0.0);
        h.observe(10);
        h.observe(30);
        assert_eq!(h.count(), 2);
        assert_eq!(h.mean(), 20.0);
    }
}
