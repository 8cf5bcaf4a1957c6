//! Common types for ingestors
//!
//! Shared metrics across both transports. Connection gauges only move for
//! TCP; the UDP loop uses the message and error counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by both ingestor types
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Currently active connections (TCP only)
    pub connections_active: AtomicU64,

    /// Total connections accepted (TCP only)
    pub connections_total: AtomicU64,

    /// Connections turned away by the connection cap (TCP only)
    pub connections_rejected: AtomicU64,

    /// Messages received (lines or datagrams)
    pub messages_received: AtomicU64,

    /// Messages that passed the filter and reached the sink
    pub messages_accepted: AtomicU64,

    /// Messages dropped by the filter
    pub messages_filtered: AtomicU64,

    /// Messages dropped for exceeding the size bound (TCP only)
    pub messages_oversized: AtomicU64,

    /// Total bytes received
    pub bytes_received: AtomicU64,

    /// Transient I/O errors absorbed by the loops
    pub errors: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            connections_active: AtomicU64::new(0),
            connections_total: AtomicU64::new(0),
            connections_rejected: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            messages_accepted: AtomicU64::new(0),
            messages_filtered: AtomicU64::new(0),
            messages_oversized: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Increment active connections
    #[inline]
    pub fn connection_opened(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement active connections
    #[inline]
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a connection refused by the cap
    #[inline]
    pub fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a received message
    #[inline]
    pub fn message_received(&self, bytes: u64) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a message that reached the sink
    #[inline]
    pub fn message_accepted(&self) {
        self.messages_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message dropped by the filter
    #[inline]
    pub fn message_filtered(&self) {
        self.messages_filtered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message dropped for exceeding the size bound
    #[inline]
    pub fn message_oversized(&self) {
        self.messages_oversized.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transient error
    #[inline]
    pub fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_accepted: self.messages_accepted.load(Ordering::Relaxed),
            messages_filtered: self.messages_filtered.load(Ordering::Relaxed),
            messages_oversized: self.messages_oversized.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of metrics
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub connections_active: u64,
    pub connections_total: u64,
    pub connections_rejected: u64,
    pub messages_received: u64,
    pub messages_accepted: u64,
    pub messages_filtered: u64,
    pub messages_oversized: u64,
    pub bytes_received: u64,
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_tracking() {
        let metrics = IngestMetrics::new();

        metrics.connection_opened();
        metrics.connection_opened();
        assert_eq!(metrics.connections_active.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.connections_total.load(Ordering::Relaxed), 2);

        metrics.connection_closed();
        assert_eq!(metrics.connections_active.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.connections_total.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_message_tracking() {
        let metrics = IngestMetrics::new();

        metrics.message_received(100);
        metrics.message_received(200);
        metrics.message_accepted();
        metrics.message_filtered();
        metrics.message_oversized();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_received, 2);
        assert_eq!(snapshot.bytes_received, 300);
        assert_eq!(snapshot.messages_accepted, 1);
        assert_eq!(snapshot.messages_filtered, 1);
        assert_eq!(snapshot.messages_oversized, 1);
        // message_oversized also counts as an error
        assert_eq!(snapshot.errors, 1);
    }
}
