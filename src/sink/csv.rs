//! CSV file sink
//!
//! Writes one record per line with a single field, the sample value, and no
//! header row. The file is truncated on creation.

use crate::error::SinkError;
use crate::types::Sample;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::SampleSink;

/// Record terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n`, what spreadsheet-oriented CSV writers emit
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// How far each record is pushed before `append` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// Flush to the OS and sync file data to the storage device
    #[default]
    Sync,
    /// Flush to the OS only; survives a process kill but not a power cut
    Flush,
}

/// One-column CSV file
///
/// Records go straight to the file with a single write each, so a record
/// whose `append` failed is never written later by a buffer flush.
#[derive(Debug)]
pub struct CsvFileSink {
    file: File,
    path: PathBuf,
    line_ending: LineEnding,
    durability: Durability,
}

impl CsvFileSink {
    /// Create (or truncate) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| SinkError::Create {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Saving to: {}", path.display());

        Ok(Self {
            file,
            path,
            line_ending: LineEnding::default(),
            durability: Durability::default(),
        })
    }

    /// Set the record terminator
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the per-record durability
    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSink for CsvFileSink {
    fn append(&mut self, sample: Sample) -> Result<(), SinkError> {
        let record = format!("{}{}", sample, self.line_ending.as_str());
        self.file.write_all(record.as_bytes())?;
        self.file.flush()?;
        if self.durability == Durability::Sync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_visible_before_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvFileSink::create(&path).unwrap();
        sink.append(Sample(12)).unwrap();
        sink.append(Sample(-7)).unwrap();

        // Still open: each append must already be on disk
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "12\r\n-7\r\n");
    }

    #[test]
    fn test_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "old,data\n1,2\n").unwrap();

        let mut sink = CsvFileSink::create(&path)
            .unwrap()
            .with_line_ending(LineEnding::Lf)
            .with_durability(Durability::Flush);
        sink.append(Sample(5)).unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "5\n");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = CsvFileSink::create(&path).unwrap_err();
        assert!(matches!(err, SinkError::Create { .. }));
        assert!(err.to_string().contains("out.csv"));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_failed_append_reports_write_error() {
        let mut sink = CsvFileSink::create("/dev/full")
            .unwrap()
            .with_durability(Durability::Flush);
        let err = sink.append(Sample(42)).unwrap_err();
        assert!(matches!(err, SinkError::Write(_)));
        // Nothing was left behind to be written by a later flush
        let err = sink.append(Sample(43)).unwrap_err();
        assert!(matches!(err, SinkError::Write(_)));
    }
}
