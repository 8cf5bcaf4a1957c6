//! TCP Ingestor
//!
//! Syslog-style receiver over TCP with line-based framing.
//!
//! # Framing
//!
//! Messages are newline-delimited (non-transparent framing). Exactly one
//! trailing LF is stripped from each line; a trailing CR, when a client
//! sends CRLF, stays part of the payload. A partial line at end-of-stream
//! is dropped: only complete lines reach the filter.
//!
//! # Design
//!
//! - **One task per connection** - no pooling, no cap unless configured
//! - **Accept loop never exits** - accept errors are logged and absorbed;
//!   the only error [`TcpIngestor::run`] returns is a bind failure
//! - **No timeouts** - an idle connection holds its task indefinitely
//!
//! # Example
//!
//! ```ignore
//! let filter = Arc::new(MessageFilter::new(options)?);
//! let sink: Arc<dyn RecordSink> = Arc::new(ConsoleSink::new());
//!
//! let ingestor = TcpIngestor::new(TcpIngestorConfig::with_port(514), filter, sink);
//! ingestor.run().await?;
//! ```

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
#[cfg(unix)]
use std::os::fd::{AsRawFd, FromRawFd};
use std::sync::atomic::Ordering;
use std::sync::Arc;
#[cfg(unix)]
use std::time::Duration;

#[cfg(unix)]
use socket2::{Socket, TcpKeepalive};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use siphon_filter::MessageFilter;
use siphon_record::{RecordSink, Transport};

use crate::common::IngestMetrics;

// =============================================================================
// Constants
// =============================================================================

/// Default syslog port (privileged - may need root)
const DEFAULT_PORT: u16 = 514;

/// Default read buffer size per connection (64KB)
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default maximum line length (8KB); 0 disables the bound
const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

/// Default socket buffer size for SO_RCVBUF/SO_SNDBUF (256KB)
const DEFAULT_SOCKET_BUFFER_SIZE: usize = 256 * 1024;

/// Keepalive interval applied to every accepted connection (30s)
#[cfg(unix)]
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// TCP ingestor configuration
#[derive(Debug, Clone)]
pub struct TcpIngestorConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub address: String,

    /// Listen port
    pub port: u16,

    /// Read buffer size per connection
    pub buffer_size: usize,

    /// Maximum line length in bytes; longer lines are consumed and dropped.
    /// 0 removes the bound entirely (an unterminated line can then grow the
    /// reader's buffer without limit).
    pub max_message_size: usize,

    /// Maximum simultaneous connections; 0 = unlimited
    pub max_connections: usize,

    /// TCP nodelay (disable Nagle's algorithm)
    pub nodelay: bool,

    /// Socket buffer size for SO_RCVBUF/SO_SNDBUF
    pub socket_buffer_size: usize,
}

impl Default for TcpIngestorConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_connections: 0,
            nodelay: true,
            socket_buffer_size: DEFAULT_SOCKET_BUFFER_SIZE,
        }
    }
}

impl TcpIngestorConfig {
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

/// TCP ingestor errors
#[derive(Debug, thiserror::Error)]
pub enum TcpIngestorError {
    /// Failed to bind to address
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

/// TCP ingestor
///
/// Accepts connections and reads newline-delimited messages, filtering each
/// one and handing accepted messages to the sink.
pub struct TcpIngestor {
    /// Configuration
    config: TcpIngestorConfig,

    /// Shared filter (immutable, lock-free reads)
    filter: Arc<MessageFilter>,

    /// Destination for accepted messages
    sink: Arc<dyn RecordSink>,

    /// Metrics
    metrics: Arc<IngestMetrics>,
}

impl TcpIngestor {
    /// Create a new TCP ingestor
    pub fn new(
        config: TcpIngestorConfig,
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
    /// Returns only on bind failure; after a successful bind the accept loop
    /// runs until the process terminates.
    pub async fn run(&self) -> Result<Infallible, TcpIngestorError> {
        let bind_addr = self.config.bind_address();

        let listener =
            TcpListener::bind(&bind_addr)
                .await
                .map_err(|e| TcpIngestorError::Bind {
                    address: bind_addr.clone(),
                    source: e,
                })?;

        tracing::info!(
            address = %bind_addr,
            max_message_size = self.config.max_message_size,
            max_connections = self.config.max_connections,
            "TCP ingestor listening"
        );

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    if self.at_connection_cap() {
                        self.metrics.connection_rejected();
                        tracing::warn!(
                            peer = %peer_addr,
                            max = self.config.max_connections,
                            "connection limit reached, dropping connection"
                        );
                        continue;
                    }

                    self.metrics.connection_opened();
                    self.configure_socket(&stream);

                    let handler = ConnectionHandler {
                        config: self.config.clone(),
                        filter: Arc::clone(&self.filter),
                        sink: Arc::clone(&self.sink),
                        metrics: Arc::clone(&self.metrics),
                        peer_addr,
                    };

                    tokio::spawn(async move {
                        handler.handle(stream).await;
                    });
                }
                Err(e) => {
                    self.metrics.error();
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }

    fn at_connection_cap(&self) -> bool {
        self.config.max_connections > 0
            && self.metrics.connections_active.load(Ordering::Relaxed)
                >= self.config.max_connections as u64
    }

    /// Configure socket options using socket2 (Unix only)
    #[cfg(unix)]
    fn configure_socket(&self, stream: &TcpStream) {
        let fd = stream.as_raw_fd();

        // SAFETY: the fd is borrowed for the duration of this call; forget()
        // below keeps socket2 from closing it - tokio still owns it.
        let socket = unsafe { Socket::from_raw_fd(fd) };

        if self.config.nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(error = %e, "failed to set TCP_NODELAY");
            }
        }

        if let Err(e) = socket.set_recv_buffer_size(self.config.socket_buffer_size) {
            tracing::warn!(error = %e, "failed to set SO_RCVBUF");
        }
        if let Err(e) = socket.set_send_buffer_size(self.config.socket_buffer_size) {
            tracing::warn!(error = %e, "failed to set SO_SNDBUF");
        }

        let keepalive = TcpKeepalive::new().with_time(KEEPALIVE_INTERVAL);
        if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
            tracing::warn!(error = %e, "failed to set TCP keepalive");
        }

        // Don't close the fd - tokio owns it
        std::mem::forget(socket);
    }

    /// Configure socket - no-op off Unix (tokio defaults are sufficient)
    #[cfg(not(unix))]
    fn configure_socket(&self, _stream: &TcpStream) {}
}

// =============================================================================
// Connection Handler
// =============================================================================

/// Handles a single TCP connection
struct ConnectionHandler {
    config: TcpIngestorConfig,
    filter: Arc<MessageFilter>,
    sink: Arc<dyn RecordSink>,
    metrics: Arc<IngestMetrics>,
    peer_addr: SocketAddr,
}

impl ConnectionHandler {
    /// Read lines until EOF or a read error; either ends only this task.
    async fn handle(self, stream: TcpStream) {
        let mut reader = BufReader::with_capacity(self.config.buffer_size, stream);

        // Line buffer, reused across reads
        let mut line_buf = Vec::new();

        loop {
            match read_delimited_line(&mut reader, &mut line_buf, self.config.max_message_size)
                .await
            {
                Ok(ReadLineResult::Line(bytes_read)) => {
                    self.metrics.message_received(bytes_read as u64);

                    // Strip exactly the LF delimiter; a trailing CR stays in
                    // the payload.
                    let mut line_len = line_buf.len();
                    if line_len > 0 && line_buf[line_len - 1] == b'\n' {
                        line_len -= 1;
                    }

                    let message = String::from_utf8_lossy(&line_buf[..line_len]);

                    if self.filter.should_accept(&message, self.peer_addr) {
                        self.metrics.message_accepted();
                        self.sink.record(&message, Transport::Tcp, self.peer_addr);
                    } else {
                        self.metrics.message_filtered();
                    }
                }
                Ok(ReadLineResult::TooLong) => {
                    self.metrics.message_oversized();
                    tracing::debug!(
                        peer = %self.peer_addr,
                        max = self.config.max_message_size,
                        "line too long, dropped"
                    );
                }
                Ok(ReadLineResult::Eof) => {
                    break;
                }
                Err(e) => {
                    if !is_connection_reset(&e) {
                        self.metrics.error();
                        tracing::debug!(
                            peer = %self.peer_addr,
                            error = %e,
                            "TCP read error"
                        );
                    }
                    break;
                }
            }
        }

        // Single release point for every exit path above
        self.metrics.connection_closed();
    }
}

// =============================================================================
// Bounded Line Reading
// =============================================================================

/// Result of reading a bounded line
enum ReadLineResult {
    /// Complete line read (byte count includes the delimiter)
    Line(usize),
    /// Line exceeded the bound and was consumed/discarded
    TooLong,
    /// End of stream; a partial line, if any, is dropped
    Eof,
}

/// Read one LF-terminated line with a bounded buffer.
///
/// Reads until LF or until `max_size` bytes (including the delimiter) have
/// accumulated; `max_size == 0` removes the bound. When the bound is hit
/// the rest of the line is still consumed so framing stays intact.
async fn read_delimited_line<R: AsyncBufReadExt + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_size: usize,
) -> io::Result<ReadLineResult> {
    buf.clear();

    let mut total_bytes = 0;
    let mut exceeded = false;

    loop {
        let available = reader.fill_buf().await?;

        if available.is_empty() {
            // EOF; only complete lines count
            return Ok(ReadLineResult::Eof);
        }

        let (bytes_to_consume, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true), // Include delimiter
            None => (available.len(), false),
        };

        if !exceeded {
            let space = if max_size == 0 {
                bytes_to_consume
            } else {
                max_size.saturating_sub(buf.len()).min(bytes_to_consume)
            };
            buf.extend_from_slice(&available[..space]);
            if space < bytes_to_consume {
                exceeded = true;
            }
        }

        total_bytes += bytes_to_consume;
        reader.consume(bytes_to_consume);

        if done {
            return if exceeded {
                Ok(ReadLineResult::TooLong)
            } else {
                Ok(ReadLineResult::Line(total_bytes))
            };
        }
    }
}

/// Check if error is a connection reset (expected noise, not logged)
fn is_connection_reset(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

#[cfg(test)]
#[path = "tcp_test.rs"]
mod tcp_test;
