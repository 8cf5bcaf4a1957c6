//! Record vocabulary
//!
//! The seam between ingestors and sinks. An accepted message travels as a
//! `(message, transport, source address)` triple; ingestors call
//! [`RecordSink::record`] once per accepted message, and a sink owns whatever
//! serialization its destination needs.
//!
//! # Design
//!
//! - **One-method contract** - sinks observe accepted messages, nothing else
//! - **Concurrent callers** - `record` is invoked from whichever ingestion
//!   task accepted the message, so implementations must be `Send + Sync`
//! - **No backpressure** - the call returns nothing; a sink that cannot keep
//!   up drops or blocks internally

use std::fmt;
use std::net::SocketAddr;

/// Transport a message arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Stream transport, newline-delimited messages
    Tcp,
    /// Datagram transport, one message per packet
    Udp,
}

impl Transport {
    /// Lowercase tag used in log fields
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }

    /// Uppercase tag used in output lines
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output sink contract
///
/// Invoked once per accepted message, concurrently from any number of
/// ingestion tasks. The caller does not observe a result; write failures are
/// the sink's own concern.
pub trait RecordSink: Send + Sync {
    /// Record one accepted message with its transport tag and source address
    fn record(&self, message: &str, transport: Transport, source: SocketAddr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_transport_tags() {
        assert_eq!(Transport::Tcp.as_str(), "tcp");
        assert_eq!(Transport::Udp.as_str(), "udp");
        assert_eq!(Transport::Tcp.label(), "TCP");
        assert_eq!(Transport::Udp.label(), "UDP");
    }

    #[test]
    fn test_transport_display() {
        assert_eq!(Transport::Tcp.to_string(), "tcp");
        assert_eq!(Transport::Udp.to_string(), "udp");
    }

    #[test]
    fn test_sink_object_safety() {
        struct Capture(Mutex<Vec<String>>);

        impl RecordSink for Capture {
            fn record(&self, message: &str, transport: Transport, source: SocketAddr) {
                self.0
                    .lock()
                    .unwrap()
                    .push(format!("[{}][{}] {}", transport.label(), source, message));
            }
        }

        let sink: Box<dyn RecordSink> = Box::new(Capture(Mutex::new(Vec::new())));
        let addr: SocketAddr = "10.0.0.1:514".parse().unwrap();
        sink.record("<13>hello", Transport::Udp, addr);
    }
}
