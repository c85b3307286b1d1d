//! # ppg-recorder: time-boxed serial sample recorder
//!
//! Records newline-delimited integer readings from a serial sensor (for
//! example a photoplethysmography board) into a one-column CSV file for a
//! fixed recording window.
//!
//! ## Architecture
//!
//! - **Device**: owns the serial connection and yields raw lines
//! - **Parser**: turns a raw line into a sample, or discards it
//! - **Session**: drives the loop, writes each sample durably, and decides
//!   when the recording ends (window elapsed, manual stop, or failure)
//! - **Sink**: the output file, synced after every record
//!
//! ## Configuration
//!
//! Settings come from a TOML file (see [`config`]) overlaid by command line
//! flags. Every setting has a default, matching a 60 second recording at
//! 9600 baud.
//!
//! ## Example
//!
//! ```ignore
//! use ppg_recorder::{app::run_recording, CancelToken, RecorderConfig};
//! use ppg_recorder::device::SerialConnector;
//!
//! let mut config = RecorderConfig::default();
//! config.device.port = "COM15".to_string();
//!
//! let cancel = CancelToken::new();
//! ppg_recorder::cancel::install_ctrl_c_handler(cancel.clone())?;
//!
//! let summary = run_recording(&config, &SerialConnector, &cancel)?;
//! println!("{} samples", summary.stats.samples_recorded);
//! ```

pub mod app;
pub mod cancel;
pub mod config;
pub mod device;
pub mod error;
pub mod parser;
pub mod session;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use config::RecorderConfig;
pub use error::{DeviceError, RecorderError, Result, SessionError, SinkError};
pub use parser::parse_line;
pub use session::{SessionOutcome, SessionRecorder, SessionSummary};
pub use types::{RawLine, Sample};
