//! Output sinks
//!
//! A sink receives accepted samples one at a time. Every append must be
//! durable before it returns: the recorder reads the next line only after
//! the previous sample is on disk.
//!
//! - [`CsvFileSink`] - one-column CSV file, synced per record
//! - [`MemorySink`] - shared in-memory record list, for tests
//!
//! [`RecordSink`] is the session's owned handle around a sink. It releases
//! the sink exactly once and refuses writes afterwards.

pub mod csv;
pub mod memory;

pub use self::csv::{CsvFileSink, Durability, LineEnding};
pub use memory::MemorySink;

use crate::error::SinkError;
use crate::types::Sample;

/// Destination for accepted samples
#[cfg_attr(test, mockall::automock)]
pub trait SampleSink: Send {
    /// Append one sample as one durable record
    fn append(&mut self, sample: Sample) -> Result<(), SinkError>;

    /// Flush anything outstanding before the sink is dropped
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Human readable description of the destination
    fn describe(&self) -> String;
}

/// Owned handle to an open sink
///
/// Dropping the handle finishes and releases the sink.
pub struct RecordSink<W: SampleSink> {
    sink: Option<W>,
    description: String,
    records_written: u64,
}

impl<W: SampleSink> RecordSink<W> {
    /// Take ownership of a sink
    pub fn new(sink: W) -> Self {
        let description = sink.describe();
        Self {
            sink: Some(sink),
            description,
            records_written: 0,
        }
    }

    /// Append one record
    ///
    /// Fails with [`SinkError::Released`] once the handle is closed.
    pub fn append(&mut self, sample: Sample) -> Result<(), SinkError> {
        let sink = self.sink.as_mut().ok_or(SinkError::Released)?;
        sink.append(sample)?;
        self.records_written += 1;
        Ok(())
    }

    /// Finish and release the sink
    ///
    /// Returns `Ok(true)` if this call released it, `Ok(false)` if it was
    /// already released. The sink is released even when finishing fails.
    pub fn close(&mut self) -> Result<bool, SinkError> {
        match self.sink.take() {
            Some(mut sink) => {
                let finished = sink.finish();
                drop(sink);
                tracing::debug!(
                    records = self.records_written,
                    "Output closed: {}",
                    self.description
                );
                finished.map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Check if the sink is still held
    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    /// Records appended through this handle
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Description captured at creation time
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<W: SampleSink> Drop for RecordSink<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to finish {}: {}", self.description, e);
        }
    }
}

impl<W: SampleSink> std::fmt::Debug for RecordSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSink")
            .field("description", &self.description)
            .field("open", &self.is_open())
            .field("records_written", &self.records_written)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_sink() -> MockSampleSink {
        let mut mock = MockSampleSink::new();
        mock.expect_describe().return_const("mock".to_string());
        mock
    }

    #[test]
    fn test_append_after_close_is_released() {
        let mut mock = mock_sink();
        mock.expect_append().times(1).returning(|_| Ok(()));
        mock.expect_finish().times(1).returning(|| Ok(()));

        let mut sink = RecordSink::new(mock);
        sink.append(Sample(1)).unwrap();
        assert!(sink.close().unwrap());
        assert!(!sink.close().unwrap());
        assert!(matches!(sink.append(Sample(2)), Err(SinkError::Released)));
        assert_eq!(sink.records_written(), 1);
    }

    #[test]
    fn test_failed_append_is_not_counted() {
        let mut mock = mock_sink();
        mock.expect_append().returning(|_| {
            Err(SinkError::Write(std::io::Error::other("disk full")))
        });
        mock.expect_finish().returning(|| Ok(()));

        let mut sink = RecordSink::new(mock);
        assert!(sink.append(Sample(1)).is_err());
        assert_eq!(sink.records_written(), 0);
    }

    #[test]
    fn test_drop_finishes_once() {
        let mut mock = mock_sink();
        mock.expect_finish().times(1).returning(|| Ok(()));
        let sink = RecordSink::new(mock);
        drop(sink);
    }

    #[test]
    fn test_close_releases_even_when_finish_fails() {
        let mut mock = mock_sink();
        mock.expect_finish()
            .times(1)
            .returning(|| Err(SinkError::Write(std::io::Error::other("sync failed"))));

        let mut sink = RecordSink::new(mock);
        assert!(sink.close().is_err());
        assert!(!sink.is_open());
        assert!(!sink.close().unwrap());
    }
}
