//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::path::Path;
use std::time::Duration;

/// Read timeout used by fast tests
pub fn test_timeout() -> Duration {
    Duration::from_millis(10)
}

/// Scheduling slack allowed on top of any timing bound
pub fn timing_slack() -> Duration {
    Duration::from_millis(150)
}

/// Parse a recorded CSV file back into its values
pub fn read_records(path: &Path) -> Vec<i64> {
    std::fs::read_to_string(path)
        .expect("output file should exist")
        .lines()
        .map(|l| l.trim_end_matches('\r').parse().expect("record is an integer"))
        .collect()
}
