//! Siphon Sinks
//!
//! Output sinks implementing the [`siphon_record::RecordSink`] contract.
//! Every sink is called synchronously from whichever ingestion task accepted
//! a message and serializes its own writes.
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | `console` | Human-readable lines on stdout |
//! | `file` | Append-only log file |
//! | `fanout` | Forward each record to several sinks |
//!
//! # Output Format
//!
//! Console and file share one line format:
//!
//! ```text
//! 2025-01-15 10:30:45.123 [TCP][192.168.1.7:40312] <13>Dec 20 12:34:56 host app: started
//! 2025-01-15 10:30:45.961 [UDP][10.0.0.3:514] <4>watchdog barked
//! ```

pub mod console;
pub mod fanout;
pub mod file;

mod common;

pub use common::{SinkError, SinkMetrics, SinkMetricsSnapshot};
pub use console::ConsoleSink;
pub use fanout::FanoutSink;
pub use file::FileSink;
