//! Tests for the fanout sink

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use siphon_record::{RecordSink, Transport};

use crate::fanout::FanoutSink;

#[derive(Default)]
struct CaptureSink {
    messages: Mutex<Vec<String>>,
}

impl RecordSink for CaptureSink {
    fn record(&self, message: &str, _transport: Transport, _source: SocketAddr) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

#[test]
fn test_forwards_to_all_children() {
    let first = Arc::new(CaptureSink::default());
    let second = Arc::new(CaptureSink::default());

    let fanout = FanoutSink::new(vec![
        Arc::clone(&first) as Arc<dyn RecordSink>,
        Arc::clone(&second) as Arc<dyn RecordSink>,
    ]);
    assert_eq!(fanout.len(), 2);

    fanout.record("<3>hello", Transport::Tcp, addr("10.0.0.1:1000"));
    fanout.record("<4>world", Transport::Udp, addr("10.0.0.2:2000"));

    for sink in [&first, &second] {
        let messages = sink.messages.lock().unwrap();
        assert_eq!(*messages, vec!["<3>hello".to_string(), "<4>world".to_string()]);
    }
}

#[test]
fn test_empty_fanout_is_a_no_op() {
    let fanout = FanoutSink::new(Vec::new());
    assert!(fanout.is_empty());

    // Must not panic
    fanout.record("<3>void", Transport::Tcp, addr("10.0.0.1:1000"));
}
