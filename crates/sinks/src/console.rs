//! Console sink
//!
//! Writes one line per accepted record to stdout. Intended as the default
//! output and for debugging; at high throughput prefer the file sink.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use siphon_record::{RecordSink, Transport};

use crate::common::{format_record, SinkMetrics, SinkMetricsSnapshot};

/// Console sink for accepted records
#[derive(Default)]
pub struct ConsoleSink {
    /// Metrics
    metrics: Arc<SinkMetrics>,
}

impl ConsoleSink {
    /// Create a new console sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a metrics snapshot
    pub fn metrics(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl RecordSink for ConsoleSink {
    fn record(&self, message: &str, transport: Transport, source: SocketAddr) {
        let line = format_record(message, transport, source);

        // The stdout lock serializes concurrent callers
        let mut out = std::io::stdout().lock();
        match writeln!(out, "{}", line) {
            Ok(()) => self.metrics.record_written(line.len() as u64 + 1),
            Err(_) => self.metrics.write_error(),
        }
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;
