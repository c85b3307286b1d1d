//! Configuration module for ppg-recorder
//!
//! This module handles recorder configuration:
//! - Device connection (port, baud rate, settle wait, read timeout)
//! - Session bound (recording window)
//! - Output file location and durability
//! - Synthetic device settings for runs without hardware
//!
//! # Config Location
//!
//! Configuration is read from a TOML file. Without an explicit `--config`,
//! the recorder looks for `recorder.toml` in the platform config directory
//! under `dev.hxyulin.ppg-recorder`:
//!
//! - **Linux**: `~/.config/dev.hxyulin.ppg-recorder/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.ppg-recorder/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.ppg-recorder\`
//!
//! Every field has a default, so a partial file is fine.
//!
//! # Example
//!
//! ```toml
//! [device]
//! port = "COM15"
//! baud_rate = 9600
//!
//! [session]
//! duration_secs = 60.0
//!
//! [output]
//! path = "ppg_raw.csv"
//! ```

use crate::device::{DeviceSettings, SyntheticConnector, Waveform};
use crate::error::{RecorderError, Result};
use crate::session::SessionSettings;
use crate::sink::{Durability, LineEnding};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config directories
pub const APP_ID: &str = "dev.hxyulin.ppg-recorder";

/// Config filename looked up in the app config directory
pub const CONFIG_FILE: &str = "recorder.toml";

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default settle wait after opening the port in milliseconds
pub const DEFAULT_SETTLE_MS: u64 = 2000;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Default recording window in seconds
pub const DEFAULT_DURATION_SECS: f64 = 60.0;

/// Default output file
pub const DEFAULT_OUTPUT_PATH: &str = "ppg_raw.csv";

/// Default port name for this platform
pub fn default_port() -> String {
    if cfg!(windows) {
        "COM15".to_string()
    } else {
        "/dev/ttyUSB0".to_string()
    }
}

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Sections ====================

/// Serial device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Port name (e.g. `/dev/ttyUSB0`, `COM15`)
    pub port: String,

    /// Line speed
    pub baud_rate: u32,

    /// Wait after opening before reading, in milliseconds
    pub settle_ms: u64,

    /// Upper bound on a single read, in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle_ms: DEFAULT_SETTLE_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// Session bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recording window in seconds
    pub duration_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV file, truncated at session start
    pub path: PathBuf,

    /// Record terminator
    pub line_ending: LineEnding,

    /// Per-record durability
    pub durability: Durability,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            line_ending: LineEnding::default(),
            durability: Durability::default(),
        }
    }
}

/// Waveform choice for the synthetic device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    #[default]
    Ppg,
    Sine,
    Counter,
}

/// Synthetic device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Use the synthetic device instead of a serial port
    pub enabled: bool,

    /// Signal shape
    pub waveform: WaveformKind,

    /// Lines per second
    pub rate_hz: f64,

    /// Pulse rate for the PPG waveform
    pub bpm: f64,

    /// Emit a telemetry line after every N samples (0 = never)
    pub garbage_every: u32,

    /// Uniform noise amplitude
    pub noise: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            waveform: WaveformKind::Ppg,
            rate_hz: 100.0,
            bpm: 72.0,
            garbage_every: 0,
            noise: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Build the synthetic connector described by these settings
    pub fn connector(&self) -> SyntheticConnector {
        let waveform = match self.waveform {
            WaveformKind::Ppg => Waveform::Ppg {
                bpm: self.bpm,
                baseline: 512.0,
                amplitude: 300.0,
            },
            WaveformKind::Sine => Waveform::Sine {
                frequency: self.bpm / 60.0,
                amplitude: 300.0,
                offset: 512.0,
            },
            WaveformKind::Counter => Waveform::Counter {
                step: 1,
                min: 0,
                max: 1023,
            },
        };
        SyntheticConnector::new(waveform, self.rate_hz)
            .with_garbage_every(self.garbage_every)
            .with_noise(self.noise)
    }
}

// ==================== Recorder Config ====================

/// Complete recorder configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub device: DeviceConfig,
    pub session: SessionConfig,
    pub output: OutputConfig,
    pub simulation: SimulationConfig,
}

impl RecorderConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecorderError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_toml(&content).map_err(|e| e.with_context(format!("{:?}", path)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RecorderError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the config file from the app config directory, if there is one
    pub fn load_default_location() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RecorderError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RecorderError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        std::fs::write(path, self.to_toml()?).map_err(|e| {
            RecorderError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Reject settings the recorder cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.device.port.trim().is_empty() {
            return Err(RecorderError::Config("device.port must not be empty".to_string()));
        }
        if self.device.baud_rate == 0 {
            return Err(RecorderError::Config("device.baud_rate must be non-zero".to_string()));
        }
        if self.device.read_timeout_ms == 0 {
            return Err(RecorderError::Config(
                "device.read_timeout_ms must be non-zero".to_string(),
            ));
        }
        self.session_duration()?;
        if self.output.path.as_os_str().is_empty() {
            return Err(RecorderError::Config("output.path must not be empty".to_string()));
        }
        if self.simulation.enabled && (self.simulation.rate_hz.is_nan() || self.simulation.rate_hz <= 0.0) {
            return Err(RecorderError::Config(
                "simulation.rate_hz must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Connection parameters for the device layer
    pub fn device_settings(&self) -> DeviceSettings {
        DeviceSettings::new(self.device.port.clone(), self.device.baud_rate)
            .with_settle(Duration::from_millis(self.device.settle_ms))
    }

    /// Timing parameters for the session layer
    pub fn session_settings(&self) -> Result<SessionSettings> {
        Ok(SessionSettings::new(self.session_duration()?)
            .with_read_timeout(Duration::from_millis(self.device.read_timeout_ms)))
    }

    fn session_duration(&self) -> Result<Duration> {
        let secs = self.session.duration_secs;
        match Duration::try_from_secs_f64(secs) {
            Ok(duration) if !duration.is_zero() => Ok(duration),
            _ => Err(RecorderError::Config(format!(
                "session.duration_secs must be a positive number of seconds, got {}",
                secs
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RecorderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.device.baud_rate, 9600);
        assert_eq!(config.session_settings().unwrap().duration, Duration::from_secs(60));
        assert_eq!(config.device_settings().settle, Duration::from_secs(2));
        assert_eq!(
            config.session_settings().unwrap().read_timeout,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = RecorderConfig::from_toml(
            r#"
            [device]
            port = "COM15"

            [session]
            duration_secs = 5.5
            "#,
        )
        .unwrap();

        assert_eq!(config.device.port, "COM15");
        assert_eq!(config.device.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(
            config.session_settings().unwrap().duration,
            Duration::from_millis(5500)
        );
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_enum_fields_lowercase() {
        let config = RecorderConfig::from_toml(
            r#"
            [output]
            line_ending = "lf"
            durability = "flush"

            [simulation]
            enabled = true
            waveform = "counter"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.line_ending, LineEnding::Lf);
        assert_eq!(config.output.durability, Durability::Flush);
        assert_eq!(config.simulation.waveform, WaveformKind::Counter);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RecorderConfig::default();
        config.device.baud_rate = 0;
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.session.duration_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.session.duration_secs = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.device.port = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.device.read_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unrepresentable_duration_is_rejected() {
        let mut config = RecorderConfig::default();
        config.session.duration_secs = 1e30;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("1000000000000000000000000000000"));
        assert!(config.session_settings().is_err());

        config.session.duration_secs = f64::INFINITY;
        assert!(config.validate().is_err());
        config.session.duration_secs = -1.0;
        assert!(config.session_settings().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = RecorderConfig::default();
        config.device.port = "/dev/ttyACM1".to_string();
        config.session.duration_secs = 30.0;
        config.save(&path).unwrap();

        let loaded = RecorderConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = RecorderConfig::load("/nonexistent/recorder.toml").unwrap_err();
        assert!(matches!(err, RecorderError::Config(_)));
    }
}
