//! Per-session counters

use crate::types::Sample;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics for one recording session
///
/// Tracks what came off the wire and what made it into the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Complete lines received from the device
    pub lines_read: u64,
    /// Samples written to the output
    pub samples_recorded: u64,
    /// Lines that did not decode as a sample
    pub lines_discarded: u64,
    /// Reads that returned without a line
    pub read_timeouts: u64,
    /// Lines that arrived after the session bound and were dropped
    pub late_lines_dropped: u64,
    /// Bytes received, excluding the `\n` terminators
    pub bytes_read: u64,
    /// Smallest recorded value
    pub min_value: Option<i64>,
    /// Largest recorded value
    pub max_value: Option<i64>,
    /// Offset from session start of the first recorded sample
    pub first_sample_at: Option<Duration>,
    /// Offset from session start of the last recorded sample
    pub last_sample_at: Option<Duration>,
}

impl SessionStats {
    /// Record a line received from the device
    pub fn record_line(&mut self, bytes: usize) {
        self.lines_read += 1;
        self.bytes_read += bytes as u64;
    }

    /// Record a sample written at `offset` from session start
    pub fn record_sample(&mut self, sample: Sample, offset: Duration) {
        let value = sample.value();
        self.samples_recorded += 1;
        self.min_value = Some(self.min_value.map_or(value, |m| m.min(value)));
        self.max_value = Some(self.max_value.map_or(value, |m| m.max(value)));
        self.first_sample_at.get_or_insert(offset);
        self.last_sample_at = Some(offset);
    }

    /// Record a line that did not decode
    pub fn record_discard(&mut self) {
        self.lines_discarded += 1;
    }

    /// Record a read that timed out
    pub fn record_timeout(&mut self) {
        self.read_timeouts += 1;
    }

    /// Record a line dropped because the bound was already reached
    pub fn record_late_drop(&mut self) {
        self.late_lines_dropped += 1;
    }

    /// Share of received lines that were discarded, as percentage
    pub fn discard_rate(&self) -> f64 {
        if self.lines_read == 0 {
            0.0
        } else {
            (self.lines_discarded as f64 / self.lines_read as f64) * 100.0
        }
    }

    /// Average rate between the first and last recorded samples
    pub fn sample_rate_hz(&self) -> f64 {
        match (self.first_sample_at, self.last_sample_at) {
            (Some(first), Some(last)) if last > first && self.samples_recorded > 1 => {
                (self.samples_recorded - 1) as f64 / (last - first).as_secs_f64()
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tracking() {
        let mut stats = SessionStats::default();
        stats.record_sample(Sample(10), Duration::from_millis(100));
        stats.record_sample(Sample(-3), Duration::from_millis(200));
        stats.record_sample(Sample(7), Duration::from_millis(300));

        assert_eq!(stats.samples_recorded, 3);
        assert_eq!(stats.min_value, Some(-3));
        assert_eq!(stats.max_value, Some(10));
        assert_eq!(stats.first_sample_at, Some(Duration::from_millis(100)));
        assert_eq!(stats.last_sample_at, Some(Duration::from_millis(300)));
        assert!((stats.sample_rate_hz() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_discard_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.discard_rate(), 0.0);
        for _ in 0..4 {
            stats.record_line(3);
        }
        stats.record_discard();
        assert_eq!(stats.discard_rate(), 25.0);
        assert_eq!(stats.bytes_read, 12);
    }

    #[test]
    fn test_rate_needs_two_samples() {
        let mut stats = SessionStats::default();
        stats.record_sample(Sample(1), Duration::from_millis(5));
        assert_eq!(stats.sample_rate_hz(), 0.0);
    }
}
