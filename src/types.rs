//! Core data types shared by the device, parser, and session layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// One undecoded line of bytes received from the device
///
/// The trailing `\n` is not included. Anything else the device sent,
/// including a `\r`, surrounding whitespace or non-UTF-8 bytes, is kept
/// as-is for the parser to judge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLine(Vec<u8>);

impl RawLine {
    /// Create a raw line from bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes of the line
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the line
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the line carried no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RawLine {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for RawLine {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for RawLine {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for RawLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0).escape_debug())
    }
}

/// One decoded integer reading from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(pub i64);

impl Sample {
    /// The sample value
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Sample {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_line_display_escapes() {
        let line = RawLine::from("12\r");
        assert_eq!(line.to_string(), "12\\r");
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn test_raw_line_display_lossy() {
        let line = RawLine::new(vec![0xff, b'4']);
        assert!(line.to_string().ends_with('4'));
        assert_eq!(line.as_bytes(), &[0xff, b'4']);
    }

    #[test]
    fn test_sample_display() {
        assert_eq!(Sample(-7).to_string(), "-7");
        assert_eq!(Sample::from(12).value(), 12);
    }
}
