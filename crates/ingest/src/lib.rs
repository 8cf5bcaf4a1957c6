//! Siphon Ingestors
//!
//! One module per transport. Each ingestor owns its listener/socket, runs
//! its receive loop forever, and pushes every message through the shared
//! [`siphon_filter::MessageFilter`]; accepted messages are handed to the
//! injected [`siphon_record::RecordSink`].
//!
//! # Available Ingestors
//!
//! - **TCP** - newline-framed messages, one task per connection
//! - **UDP** - one message per datagram, single receive loop
//!
//! # Design
//!
//! - Bind failure is the only error either `run()` ever returns
//! - Transient I/O errors are logged and absorbed; they never stop a loop
//! - There is no cancellation path and no timeout anywhere; shutdown is
//!   whole-process termination

mod common;
pub mod tcp;
pub mod udp;

#[cfg(test)]
mod test_util;

pub use common::{IngestMetrics, MetricsSnapshot};
pub use tcp::{TcpIngestor, TcpIngestorConfig, TcpIngestorError};
pub use udp::{UdpIngestor, UdpIngestorConfig, UdpIngestorError};
