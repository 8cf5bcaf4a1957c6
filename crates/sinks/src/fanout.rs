//! Fanout sink
//!
//! Forwards every record to a list of child sinks in order. Used when more
//! than one output is configured (e.g. console and file together).

use std::net::SocketAddr;
use std::sync::Arc;

use siphon_record::{RecordSink, Transport};

/// Sink that duplicates records across several child sinks
pub struct FanoutSink {
    sinks: Vec<Arc<dyn RecordSink>>,
}

impl FanoutSink {
    /// Create a fanout over the given sinks
    pub fn new(sinks: Vec<Arc<dyn RecordSink>>) -> Self {
        Self { sinks }
    }

    /// Number of child sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no child sinks
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl RecordSink for FanoutSink {
    fn record(&self, message: &str, transport: Transport, source: SocketAddr) {
        for sink in &self.sinks {
            sink.record(message, transport, source);
        }
    }
}

#[cfg(test)]
#[path = "fanout_test.rs"]
mod fanout_test;
