//! Line decoding
//!
//! Serial telemetry routinely interleaves garbage with real readings: boot
//! banners, half lines after connecting mid-transmission, line noise. A line
//! that does not decode is therefore not an error. [`parse_line`] returns
//! `None` for it and the caller moves on.
//!
//! A line decodes only if, after trimming surrounding whitespace and line
//! terminators, the whole remainder is a base-10 signed integer that fits in
//! an `i64`. There is no partial matching: `"12abc"` is discarded, not read
//! as `12`.

use crate::types::{RawLine, Sample};

/// Decode one raw line into a sample
pub fn parse_line(line: &RawLine) -> Option<Sample> {
    parse_bytes(line.as_bytes())
}

/// Decode a byte slice into a sample
pub fn parse_bytes(bytes: &[u8]) -> Option<Sample> {
    let text = std::str::from_utf8(bytes).ok()?;
    text.trim().parse::<i64>().ok().map(Sample)
}
