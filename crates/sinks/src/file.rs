//! File sink
//!
//! Appends one line per accepted record to a log file. The file is opened
//! once at startup (fail-fast); per-record write failures are logged and
//! counted but never stop ingestion.
//!
//! No rotation: the file grows until external tooling handles it.

use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use siphon_record::{RecordSink, Transport};

use crate::common::{format_record, SinkError, SinkMetrics, SinkMetricsSnapshot};

/// File sink for accepted records
#[derive(Debug)]
pub struct FileSink {
    /// Output path (for logging)
    path: PathBuf,

    /// Line-buffered writer; the mutex serializes concurrent callers
    writer: Mutex<LineWriter<File>>,

    /// Metrics
    metrics: Arc<SinkMetrics>,
}

impl FileSink {
    /// Open (or create) the log file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.display().to_string(),
                source,
            })?;

        tracing::info!(path = %path.display(), "file sink opened");

        Ok(Self {
            path,
            writer: Mutex::new(LineWriter::new(file)),
            metrics: Arc::new(SinkMetrics::new()),
        })
    }

    /// Get the output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a metrics snapshot
    pub fn metrics(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl RecordSink for FileSink {
    fn record(&self, message: &str, transport: Transport, source: SocketAddr) {
        let line = format_record(message, transport, source);

        // A poisoned lock only means another writer panicked mid-write;
        // the writer itself is still usable.
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match writeln!(writer, "{}", line) {
            Ok(()) => self.metrics.record_written(line.len() as u64 + 1),
            Err(e) => {
                self.metrics.write_error();
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "file sink write failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;
