//! LineSource trait for a unified device interface
//!
//! This module provides the common traits for every device implementation,
//! enabling real serial ports as well as scripted and synthetic devices for
//! testing and demos.

use crate::error::DeviceError;
use crate::types::RawLine;
use std::time::Duration;

/// A connected device producing newline-delimited lines
///
/// Implementations must be `Send` so a session can be moved to a worker
/// thread.
///
/// # Example
///
/// ```ignore
/// fn next_reading(source: &mut dyn LineSource) -> Option<Sample> {
///     match source.read_line(Duration::from_millis(100)) {
///         Ok(line) => parse_line(&line),
///         Err(_) => None,
///     }
/// }
/// ```
pub trait LineSource: Send {
    /// Read one complete line
    ///
    /// Blocks for at most `timeout`. Returns [`DeviceError::Timeout`] if no
    /// complete line arrived in time; bytes of a partial line are kept for
    /// the next call. Returns [`DeviceError::Disconnected`] if the device is
    /// gone.
    fn read_line(&mut self, timeout: Duration) -> Result<RawLine, DeviceError>;

    /// Drop anything the device sent that has not been read yet
    ///
    /// Called once after the settle wait. The default does nothing.
    fn discard_input(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Human readable description of the device
    fn describe(&self) -> String;
}

/// Opens a [`LineSource`] for a port name and baud rate
pub trait DeviceConnector {
    /// The source type produced by this connector
    type Source: LineSource;

    /// Connect to the device
    ///
    /// Fails with [`DeviceError::Unavailable`] if the device cannot be
    /// opened.
    fn connect(&self, port: &str, baud_rate: u32) -> Result<Self::Source, DeviceError>;
}
