//! Tests for the file sink

use std::net::SocketAddr;
use std::sync::Arc;

use siphon_record::{RecordSink, Transport};

use crate::common::SinkError;
use crate::file::FileSink;

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

#[test]
fn test_open_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("siphon.log");

    let sink = FileSink::open(&path).unwrap();
    assert_eq!(sink.path(), path);
    assert!(path.exists());
}

#[test]
fn test_open_failure() {
    let err = FileSink::open("/nonexistent-dir/siphon.log").unwrap_err();
    let SinkError::Open { path, .. } = err;
    assert_eq!(path, "/nonexistent-dir/siphon.log");
}

#[test]
fn test_records_are_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("siphon.log");

    let sink = FileSink::open(&path).unwrap();
    sink.record("<3>first", Transport::Tcp, addr("192.168.1.7:40312"));
    sink.record("<4>second", Transport::Udp, addr("10.0.0.3:514"));
    drop(sink);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[TCP][192.168.1.7:40312] <3>first"));
    assert!(lines[1].ends_with("[UDP][10.0.0.3:514] <4>second"));
}

#[test]
fn test_append_mode_keeps_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("siphon.log");
    std::fs::write(&path, "existing line\n").unwrap();

    let sink = FileSink::open(&path).unwrap();
    sink.record("<3>new", Transport::Tcp, addr("10.0.0.1:1000"));
    drop(sink);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("existing line\n"));
    assert!(contents.lines().count() == 2);
}

#[test]
fn test_metrics_count_writes() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::open(dir.path().join("siphon.log")).unwrap();

    sink.record("<3>msg", Transport::Tcp, addr("10.0.0.1:1000"));

    let snapshot = sink.metrics();
    assert_eq!(snapshot.records_written, 1);
    assert!(snapshot.bytes_written > 0);
    assert_eq!(snapshot.write_errors, 0);
}

#[test]
fn test_concurrent_writers_produce_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("siphon.log");
    let sink = Arc::new(FileSink::open(&path).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let sink = Arc::clone(&sink);
            std::thread::spawn(move || {
                for j in 0..50 {
                    let msg = format!("<5>writer {} line {}", i, j);
                    sink.record(&msg, Transport::Tcp, addr("10.0.0.1:1000"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    drop(sink);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 200);
    // No interleaving: every line carries the full record format
    assert!(lines.iter().all(|l| l.contains("[TCP][10.0.0.1:1000] <5>writer")));
}
