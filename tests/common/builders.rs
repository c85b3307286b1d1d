//! Test data builders for creating test objects

use ppg_recorder::sink::LineEnding;
use ppg_recorder::RecorderConfig;
use std::path::Path;
use std::time::Duration;

/// Builder for recorder configs that run fast and write into a temp dir
pub struct ConfigBuilder {
    config: RecorderConfig,
}

impl ConfigBuilder {
    pub fn new(dir: &Path) -> Self {
        let mut config = RecorderConfig::default();
        config.device.port = "test-port".to_string();
        config.device.settle_ms = 0;
        config.device.read_timeout_ms = 10;
        config.session.duration_secs = 0.3;
        config.output.path = dir.join("ppg_raw.csv");
        Self { config }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.session.duration_secs = duration.as_secs_f64();
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.device.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.config.device.settle_ms = settle.as_millis() as u64;
        self
    }

    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.config.output.line_ending = line_ending;
        self
    }

    pub fn build(self) -> RecorderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new(dir.path())
            .duration(Duration::from_secs(2))
            .read_timeout(Duration::from_millis(25))
            .build();

        config.validate().unwrap();
        assert_eq!(config.session.duration_secs, 2.0);
        assert_eq!(config.device.read_timeout_ms, 25);
        assert_eq!(config.device.settle_ms, 0);
    }
}
