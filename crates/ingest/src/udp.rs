//! UDP Ingestor
//!
//! Syslog-style receiver over UDP: one socket, one receive loop, one message
//! per datagram.
//!
//! # Design
//!
//! - **Single loop** - datagrams are independent, no per-peer state
//! - **One reusable buffer** - sized to the maximum UDP payload; exactly the
//!   received length is copied out per datagram
//! - **Verbatim payloads** - no delimiter handling and no trimming; a
//!   datagram ending in a newline keeps it
//! - **Receive errors are absorbed** - logged, counted, loop continues
//!
//! # Example
//!
//! ```ignore
//! let filter = Arc::new(MessageFilter::new(options)?);
//! let sink: Arc<dyn RecordSink> = Arc::new(ConsoleSink::new());
//!
//! let ingestor = UdpIngestor::new(UdpIngestorConfig::with_port(514), filter, sink);
//! ingestor.run().await?;
//! ```

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use siphon_filter::MessageFilter;
use siphon_record::{RecordSink, Transport};

use crate::common::IngestMetrics;

// =============================================================================
// Constants
// =============================================================================

/// Default syslog port (privileged - may need root)
const DEFAULT_PORT: u16 = 514;

/// Maximum UDP payload; the receive buffer is sized to this
const MAX_DATAGRAM_SIZE: usize = 65535;

/// Default socket buffer size (64KB)
const DEFAULT_SOCKET_BUFFER_SIZE: usize = 64 * 1024;

/// SO_RCVBUF multiplier to absorb datagram bursts
const RECV_BUFFER_MULTIPLIER: usize = 4;

// =============================================================================
// Configuration
// =============================================================================

/// UDP ingestor configuration
#[derive(Debug, Clone)]
pub struct UdpIngestorConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub address: String,

    /// Listen port
    pub port: u16,

    /// Socket buffer size; SO_RCVBUF is set to a multiple of this
    pub socket_buffer_size: usize,
}

impl Default for UdpIngestorConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            socket_buffer_size: DEFAULT_SOCKET_BUFFER_SIZE,
        }
    }
}

impl UdpIngestorConfig {
    /// Create config with custom port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// UDP ingestor errors
#[derive(Debug, thiserror::Error)]
pub enum UdpIngestorError {
    /// Failed to bind the socket
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

// =============================================================================
// Ingestor Implementation
// =============================================================================

/// UDP ingestor
///
/// Receives datagrams and filters each one as a standalone message,
/// handing accepted messages to the sink.
pub struct UdpIngestor {
    /// Configuration
    config: UdpIngestorConfig,

    /// Shared filter (immutable, lock-free reads)
    filter: Arc<MessageFilter>,

    /// Destination for accepted messages
    sink: Arc<dyn RecordSink>,

    /// Metrics
    metrics: Arc<IngestMetrics>,
}

impl UdpIngestor {
    /// Create a new UDP ingestor
    pub fn new(
        config: UdpIngestorConfig,
        filter: Arc<MessageFilter>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            config,
            filter,
            sink,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> &Arc<IngestMetrics> {
        &self.metrics
    }

    /// Run the ingestor.
    ///
    /// Returns only on bind failure; after a successful bind the receive
    /// loop runs until the process terminates.
    pub async fn run(&self) -> Result<Infallible, UdpIngestorError> {
        let bind_addr = self.config.bind_address();
        let socket_addr: SocketAddr =
            bind_addr.parse().map_err(|_| UdpIngestorError::Bind {
                address: bind_addr.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "invalid socket address"),
            })?;

        let socket = self
            .create_socket(socket_addr)
            .map_err(|e| UdpIngestorError::Bind {
                address: bind_addr.clone(),
                source: e,
            })?;

        tracing::info!(address = %bind_addr, "UDP ingestor listening");

        // One reusable buffer; each datagram copies out exactly its length
        let mut recv_buf = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            match socket.recv_from(&mut recv_buf).await {
                Ok((len, peer_addr)) => {
                    self.metrics.message_received(len as u64);

                    let message = String::from_utf8_lossy(&recv_buf[..len]);

                    if self.filter.should_accept(&message, peer_addr) {
                        self.metrics.message_accepted();
                        self.sink.record(&message, Transport::Udp, peer_addr);
                    } else {
                        self.metrics.message_filtered();
                    }
                }
                Err(e) => {
                    self.metrics.error();
                    tracing::debug!(error = %e, "UDP recv error");
                }
            }
        }
    }

    /// Create the UDP socket with an enlarged receive buffer
    fn create_socket(&self, addr: SocketAddr) -> io::Result<UdpSocket> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

        // Larger receive buffer to ride out bursts
        let recv_buffer_size = self.config.socket_buffer_size * RECV_BUFFER_MULTIPLIER;
        if let Err(e) = socket.set_recv_buffer_size(recv_buffer_size) {
            tracing::warn!(
                error = %e,
                requested_size = recv_buffer_size,
                "failed to set UDP SO_RCVBUF"
            );
        }

        socket.bind(&addr.into())?;

        // Non-blocking for tokio
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        UdpSocket::from_std(std_socket)
    }
}

#[cfg(test)]
#[path = "udp_test.rs"]
mod udp_test;
