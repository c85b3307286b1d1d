//! Session data types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::stats::SessionStats;

/// Default recording window
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(60);

/// Default upper bound on a single device read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Lifecycle state of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Reading and recording samples
    #[default]
    Active,
    /// Device and output released; terminal
    Closed,
}

impl SessionState {
    /// Check if still recording
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

/// Why a session closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The recording window elapsed
    Completed,
    /// A manual stop was observed
    Cancelled,
    /// The device went away mid-session
    Disconnected,
    /// The output could not be written
    SinkFailed,
}

impl SessionOutcome {
    /// Whether the session ended without a fatal error
    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Completed | SessionOutcome::Cancelled)
    }
}

impl std::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Cancelled => "stopped manually",
            SessionOutcome::Disconnected => "device disconnected",
            SessionOutcome::SinkFailed => "output write failed",
        };
        f.write_str(s)
    }
}

/// Timing parameters of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Recording window, measured from construction
    pub duration: Duration,
    /// Upper bound on a single read; clamped to the time remaining
    pub read_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_SESSION_DURATION,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl SessionSettings {
    /// Create settings with the given window and the default read timeout
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// Report of a closed session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Why the session closed
    pub outcome: SessionOutcome,
    /// Wall-clock time the session started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Configured recording window
    pub duration: Duration,
    /// Time from start until close
    pub elapsed: Duration,
    /// Device description
    pub device: String,
    /// Output description
    pub output: String,
    /// Counters
    pub stats: SessionStats,
}

impl SessionSummary {
    /// Save the summary as pretty-printed JSON
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::RecorderError::Serialization(e.to_string()))?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success() {
        assert!(SessionOutcome::Completed.is_success());
        assert!(SessionOutcome::Cancelled.is_success());
        assert!(!SessionOutcome::Disconnected.is_success());
        assert!(!SessionOutcome::SinkFailed.is_success());
    }

    #[test]
    fn test_summary_json_roundtrips_outcome() {
        let summary = SessionSummary {
            outcome: SessionOutcome::Cancelled,
            started_at: chrono::Utc::now(),
            duration: Duration::from_secs(60),
            elapsed: Duration::from_secs(12),
            device: "COM15 @ 9600 baud".to_string(),
            output: "ppg_raw.csv".to_string(),
            stats: SessionStats::default(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        summary.save_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"cancelled\""));
        let loaded: SessionSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.outcome, SessionOutcome::Cancelled);
        assert_eq!(loaded.elapsed, Duration::from_secs(12));
    }
}
