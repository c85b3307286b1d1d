//! Serial port device backed by the `serialport` crate

use crate::error::DeviceError;
use crate::types::RawLine;
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use super::source_trait::{DeviceConnector, LineSource};

/// Bytes requested from the driver per read call
const READ_CHUNK_SIZE: usize = 256;

/// Longest line kept before it is handed to the parser unterminated
///
/// A device that never sends `\n` would otherwise grow the buffer forever.
pub const MAX_LINE_BYTES: usize = 4096;

/// Initial driver timeout, replaced on the first read
const OPEN_TIMEOUT: Duration = Duration::from_millis(100);

/// Information about a serial port found on the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedPort {
    /// OS port name (e.g. `/dev/ttyUSB0`, `COM15`)
    pub name: String,
    /// Kind of port, with USB identifiers when known
    pub kind: String,
}

impl std::fmt::Display for DetectedPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// List the serial ports available on this machine
pub fn list_ports() -> Result<Vec<DetectedPort>, DeviceError> {
    let ports = serialport::available_ports().map_err(|e| DeviceError::Unavailable {
        port: "*".to_string(),
        reason: e.to_string(),
    })?;

    Ok(ports
        .into_iter()
        .map(|info| {
            let kind = match info.port_type {
                serialport::SerialPortType::UsbPort(usb) => match usb.product {
                    Some(product) => format!("USB {:04x}:{:04x} {}", usb.vid, usb.pid, product),
                    None => format!("USB {:04x}:{:04x}", usb.vid, usb.pid),
                },
                serialport::SerialPortType::PciPort => "PCI".to_string(),
                serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                serialport::SerialPortType::Unknown => "Unknown".to_string(),
            };
            DetectedPort {
                name: info.port_name,
                kind,
            }
        })
        .collect())
}

/// Connector that opens real serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl DeviceConnector for SerialConnector {
    type Source = SerialLineSource;

    fn connect(&self, port: &str, baud_rate: u32) -> Result<SerialLineSource, DeviceError> {
        let handle = serialport::new(port, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(OPEN_TIMEOUT)
            .open()
            .map_err(|e| DeviceError::Unavailable {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        Ok(SerialLineSource::new(handle, format!("{} @ {} baud", port, baud_rate)))
    }
}

/// Line reader over an open serial port
///
/// Bytes are accumulated until a `\n` arrives, so a line split across
/// several driver reads, or across a timeout, comes out whole.
pub struct SerialLineSource {
    port: Box<dyn SerialPort>,
    name: String,
    pending: Vec<u8>,
    current_timeout: Duration,
}

impl SerialLineSource {
    /// Wrap an already open port
    pub fn new(port: Box<dyn SerialPort>, name: impl Into<String>) -> Self {
        Self {
            port,
            name: name.into(),
            pending: Vec::with_capacity(READ_CHUNK_SIZE),
            current_timeout: OPEN_TIMEOUT,
        }
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), DeviceError> {
        if timeout != self.current_timeout {
            self.port.set_timeout(timeout)?;
            self.current_timeout = timeout;
        }
        Ok(())
    }
}

impl LineSource for SerialLineSource {
    fn read_line(&mut self, timeout: Duration) -> Result<RawLine, DeviceError> {
        if let Some(line) = take_line(&mut self.pending) {
            return Ok(line);
        }

        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(DeviceError::Timeout);
            }
            self.set_timeout(remaining)?;

            match self.port.read(&mut chunk) {
                Ok(0) => {
                    return Err(DeviceError::Disconnected(format!(
                        "{} closed the stream",
                        self.name
                    )))
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    if let Some(line) = take_line(&mut self.pending) {
                        return Ok(line);
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => return Err(DeviceError::Timeout),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(DeviceError::Disconnected(e.to_string())),
            }
        }
    }

    fn discard_input(&mut self) -> Result<(), DeviceError> {
        self.pending.clear();
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Split the first complete line off the front of `pending`
///
/// Returns an overlong unterminated run as a line of its own once it
/// reaches [`MAX_LINE_BYTES`].
fn take_line(pending: &mut Vec<u8>) -> Option<RawLine> {
    if let Some(pos) = pending.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = pending.drain(..=pos).collect();
        line.pop();
        return Some(RawLine::new(line));
    }

    if pending.len() >= MAX_LINE_BYTES {
        let line: Vec<u8> = pending.drain(..MAX_LINE_BYTES).collect();
        return Some(RawLine::new(line));
    }

    None
}
