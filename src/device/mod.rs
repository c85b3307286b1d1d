//! Device access
//!
//! This module owns the connection to the sensor. [`DeviceSource`] is the
//! session's handle: it opens the device through a [`DeviceConnector`],
//! waits out the settle period, hands out raw lines, and releases the
//! device exactly once.
//!
//! # Implementations
//!
//! - [`SerialConnector`] - real serial ports via the `serialport` crate
//! - [`SyntheticConnector`] - simulated PPG sensor for demos
//! - [`ScriptedConnector`] - replays a fixed script, for tests
//!
//! # Settle period
//!
//! Many boards reset when the host opens the port (DTR toggles the reset
//! line on Arduino-style USB bridges) and print boot output before the
//! sketch starts streaming. [`DeviceSource::open`] sleeps for a fixed
//! settle period and then discards whatever arrived in the meantime.

pub mod scripted;
pub mod serial;
pub mod source_trait;
pub mod synthetic;

pub use scripted::{ScriptEnd, ScriptStep, ScriptedConnector, ScriptedSource};
pub use serial::{list_ports, DetectedPort, SerialConnector, SerialLineSource};
pub use source_trait::{DeviceConnector, LineSource};
pub use synthetic::{SyntheticConnector, SyntheticSource, Waveform};

use crate::error::DeviceError;
use crate::types::RawLine;
use std::time::Duration;

/// Connection parameters for opening a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    /// Port name as the OS knows it
    pub port: String,
    /// Line speed
    pub baud_rate: u32,
    /// Fixed wait after opening before the first read counts
    pub settle: Duration,
}

impl DeviceSettings {
    /// Create settings with no settle wait
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            settle: Duration::ZERO,
        }
    }

    /// Set the settle wait
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// Owned handle to an open device
///
/// Dropping the handle closes the device.
pub struct DeviceSource<S: LineSource> {
    source: Option<S>,
    description: String,
}

impl<S: LineSource> DeviceSource<S> {
    /// Open the device and wait out the settle period
    ///
    /// Fails with [`DeviceError::Unavailable`] if the connector cannot open
    /// the port. No handle exists in that case, so nothing needs releasing.
    pub fn open<C>(connector: &C, settings: &DeviceSettings) -> Result<Self, DeviceError>
    where
        C: DeviceConnector<Source = S>,
    {
        tracing::info!(
            port = %settings.port,
            baud = settings.baud_rate,
            "Opening device"
        );
        let source = connector.connect(&settings.port, settings.baud_rate)?;
        let mut handle = Self::from_source(source);

        if !settings.settle.is_zero() {
            tracing::debug!("Waiting {:?} for device to settle", settings.settle);
            std::thread::sleep(settings.settle);
        }

        if let Some(ref mut source) = handle.source {
            if let Err(e) = source.discard_input() {
                tracing::warn!("Could not discard settle-time input: {}", e);
            }
        }

        tracing::info!("Device ready: {}", handle.description);
        Ok(handle)
    }

    /// Wrap an already connected source, skipping the settle wait
    pub fn from_source(source: S) -> Self {
        let description = source.describe();
        Self {
            source: Some(source),
            description,
        }
    }

    /// Read one line, blocking for at most `timeout`
    ///
    /// Fails with [`DeviceError::Released`] once the handle is closed.
    pub fn read_line(&mut self, timeout: Duration) -> Result<RawLine, DeviceError> {
        match self.source {
            Some(ref mut source) => source.read_line(timeout),
            None => Err(DeviceError::Released),
        }
    }

    /// Release the device
    ///
    /// Returns `true` if this call released it, `false` if it was already
    /// released.
    pub fn close(&mut self) -> bool {
        match self.source.take() {
            Some(source) => {
                drop(source);
                tracing::debug!("Device closed: {}", self.description);
                true
            }
            None => false,
        }
    }

    /// Check if the device is still held
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Description captured at open time
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<S: LineSource> Drop for DeviceSource<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: LineSource> std::fmt::Debug for DeviceSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSource")
            .field("description", &self.description)
            .field("open", &self.is_open())
            .finish()
    }
}
