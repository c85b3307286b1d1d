//! In-memory sink
//!
//! Clones share one record list, so a test can keep a clone while the
//! session owns the other.

use crate::error::SinkError;
use crate::types::Sample;
use std::sync::{Arc, Mutex};

use super::SampleSink;

/// Shared in-memory record list
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Sample>>>,
    finished: Arc<Mutex<u32>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded values, in append order
    pub fn values(&self) -> Vec<i64> {
        self.records
            .lock()
            .map(|r| r.iter().map(|s| s.value()).collect())
            .unwrap_or_default()
    }

    /// Times `finish` was called across all clones
    pub fn finish_count(&self) -> u32 {
        self.finished.lock().map(|n| *n).unwrap_or(0)
    }
}

impl SampleSink for MemorySink {
    fn append(&mut self, sample: Sample) -> Result<(), SinkError> {
        self.records
            .lock()
            .map_err(|_| SinkError::Write(std::io::Error::other("record list poisoned")))?
            .push(sample);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if let Ok(mut n) = self.finished.lock() {
            *n += 1;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
