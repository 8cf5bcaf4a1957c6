//! Test helpers shared by the ingestor tests

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use siphon_filter::{FilterOptions, MessageFilter};
use siphon_record::{RecordSink, Transport};

/// Captured record triple
pub type Captured = (String, Transport, SocketAddr);

/// Sink that stores every record for later assertions
#[derive(Default)]
pub struct CaptureSink {
    records: Mutex<Vec<Captured>>,
}

impl CaptureSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<Captured> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl RecordSink for CaptureSink {
    fn record(&self, message: &str, transport: Transport, source: SocketAddr) {
        self.records
            .lock()
            .unwrap()
            .push((message.to_string(), transport, source));
    }
}

/// Filter that accepts everything
pub fn permissive_filter() -> Arc<MessageFilter> {
    Arc::new(MessageFilter::new(FilterOptions::default()).unwrap())
}

/// Enabled filter with only a severity threshold
pub fn severity_filter(min_severity: u8) -> Arc<MessageFilter> {
    Arc::new(
        MessageFilter::new(FilterOptions {
            enabled: true,
            allowed_sources: Vec::new(),
            min_severity,
            exclude_substrings: vec!["never-matches".into()],
        })
        .unwrap(),
    )
}

/// Reserve a localhost port by binding and dropping a listener
pub async fn free_tcp_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Reserve a localhost port by binding and dropping a UDP socket
pub async fn free_udp_port() -> u16 {
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    drop(socket);
    port
}

/// Poll until the sink holds at least `n` records or the deadline passes
pub async fn wait_for_records(sink: &CaptureSink, n: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while sink.len() < n {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {} records, have {}", n, sink.len());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
