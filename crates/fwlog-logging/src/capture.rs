//! In-memory record capture for deterministic logging assertions
//!
//! [`TestCapture`] is a `MakeWriter` that appends every written line to a
//! shared buffer. Hand a clone to [`LoggerBuilder::writer`] (or to
//! `configure_default_with_writer`) and assert on the parsed records.
//!
//! [`LoggerBuilder::writer`]: crate::sink::LoggerBuilder::writer

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

/// Shared capture buffer
#[derive(Clone, Default)]
pub struct TestCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

/// Writer handed out per record by [`TestCapture`]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for TestCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl TestCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw captured lines
    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Captured records, in write order
    ///
    /// Lines that are not valid JSON are skipped.
    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Count records matching a predicate
    pub fn count_records<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Value) -> bool,
    {
        self.records().iter().filter(|r| predicate(r)).count()
    }

    /// Count records whose `msg` equals `msg`
    pub fn count_messages(&self, msg: &str) -> usize {
        self.count_records(|r| r["msg"] == msg)
    }

    /// Assert that a record with the given message was written
    ///
    /// # Panics
    ///
    /// Panics if no such record exists
    pub fn assert_record_exists(&self, msg: &str) {
        let records = self.records();
        let found = records.iter().any(|r| r["msg"] == msg);
        assert!(
            found,
            "Expected record msg={} not found in {} captured records",
            msg,
            records.len()
        );
    }

    /// Clear all captured output
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}
