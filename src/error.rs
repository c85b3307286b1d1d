//! Error handling for ppg-recorder
//!
//! This module defines the error types for each layer of the recorder and a
//! Result alias for use throughout the crate.
//!
//! - [`DeviceError`] - serial device open/read failures
//! - [`SinkError`] - output file failures
//! - [`SessionError`] - the fatal conditions a recording session surfaces
//! - [`RecorderError`] - crate-level error used by configuration and wiring

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a device source
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The device could not be opened
    #[error("Device unavailable on {port}: {reason}")]
    Unavailable { port: String, reason: String },

    /// No complete line arrived within the read timeout
    #[error("Read timed out")]
    Timeout,

    /// The device went away while the session was running
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// The handle was already closed
    #[error("Device handle already released")]
    Released,
}

impl DeviceError {
    /// Whether the loop may keep reading after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DeviceError::Timeout)
    }
}

impl From<serialport::Error> for DeviceError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::Io(std::io::ErrorKind::TimedOut) => DeviceError::Timeout,
            _ => DeviceError::Disconnected(err.to_string()),
        }
    }
}

/// Errors raised by an output sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// The output file could not be created
    #[error("Failed to create output file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be written or synced
    #[error("Failed to write record: {0}")]
    Write(#[from] std::io::Error),

    /// The sink was already closed
    #[error("Output sink already released")]
    Released,
}

/// Fatal conditions that end a recording session
#[derive(Error, Debug)]
pub enum SessionError {
    /// Device failure (unavailable at open, or disconnected mid-session)
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Output sink failure
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Main error type for ppg-recorder operations
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised by a recording session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RecorderError>,
    },
}

impl RecorderError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RecorderError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The session error at the root of this error, if any
    pub fn session_error(&self) -> Option<&SessionError> {
        match self {
            RecorderError::Session(e) => Some(e),
            RecorderError::WithContext { source, .. } => source.session_error(),
            _ => None,
        }
    }
}

impl From<DeviceError> for RecorderError {
    fn from(err: DeviceError) -> Self {
        RecorderError::Session(SessionError::Device(err))
    }
}

impl From<SinkError> for RecorderError {
    fn from(err: SinkError) -> Self {
        RecorderError::Session(SessionError::Sink(err))
    }
}

/// Result type alias for ppg-recorder operations
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<RecorderError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecorderError::Config("baud rate must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: baud rate must be non-zero"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = RecorderError::Config("test".to_string());
        let with_ctx = err.with_context("Failed to load");
        assert!(with_ctx.to_string().contains("Failed to load"));
    }

    #[test]
    fn test_unavailable_names_port() {
        let err = DeviceError::Unavailable {
            port: "/dev/ttyUSB0".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("/dev/ttyUSB0"));
        assert!(!err.is_recoverable());
        assert!(DeviceError::Timeout.is_recoverable());
    }

    #[test]
    fn test_session_error_survives_context() {
        let result: std::result::Result<(), DeviceError> =
            Err(DeviceError::Disconnected("cable pulled".to_string()));
        let err = result.context("Recording failed").unwrap_err();
        assert!(matches!(
            err.session_error(),
            Some(SessionError::Device(DeviceError::Disconnected(_)))
        ));
    }
}
