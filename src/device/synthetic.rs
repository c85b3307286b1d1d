//! Synthetic Device Implementation
//!
//! This module provides a simulated sensor that emits integer lines at a
//! fixed rate, so the recorder can be exercised end to end without
//! hardware.
//!
//! # Waveforms
//!
//! - [`Waveform::Ppg`] - pulse-shaped signal (systolic peak plus dicrotic notch)
//! - [`Waveform::Sine`] - sinusoid with configurable frequency/amplitude
//! - [`Waveform::Counter`] - incrementing counter with wrap-around
//! - [`Waveform::Constant`] - fixed value
//!
//! The source can also interleave non-numeric telemetry lines, the way real
//! sensor firmware prints banners and status text between readings.
//!
//! # Example
//!
//! ```ignore
//! use ppg_recorder::device::{SyntheticConnector, Waveform};
//!
//! let connector = SyntheticConnector::new(Waveform::default(), 100.0)
//!     .with_garbage_every(50)
//!     .with_noise(4.0);
//! ```

use crate::error::DeviceError;
use crate::types::RawLine;
use std::time::{Duration, Instant};

use super::source_trait::{DeviceConnector, LineSource};

/// Signal shape produced by a [`SyntheticSource`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Pulse wave at `bpm` beats per minute
    Ppg {
        bpm: f64,
        baseline: f64,
        amplitude: f64,
    },
    /// Sine wave with frequency and amplitude
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Counter that increments by `step` and wraps from `max` to `min`
    Counter { step: i64, min: i64, max: i64 },
    /// Constant value
    Constant(i64),
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Ppg {
            bpm: 72.0,
            baseline: 512.0,
            amplitude: 300.0,
        }
    }
}

impl Waveform {
    /// Value of the waveform at `index` samples / `elapsed_secs` seconds
    pub fn value_at(&self, index: u64, elapsed_secs: f64) -> f64 {
        match *self {
            Waveform::Ppg {
                bpm,
                baseline,
                amplitude,
            } => {
                let phase = (elapsed_secs * bpm / 60.0).fract();
                let systolic = (-((phase - 0.2) / 0.08).powi(2)).exp();
                let dicrotic = 0.35 * (-((phase - 0.45) / 0.1).powi(2)).exp();
                baseline + amplitude * (systolic + dicrotic)
            }
            Waveform::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f64::consts::PI * frequency * elapsed_secs).sin(),
            Waveform::Counter { step, min, max } => {
                let span = (max - min).max(0) as u64 + 1;
                let advanced = (index as i64).wrapping_mul(step).rem_euclid(span as i64);
                (min + advanced) as f64
            }
            Waveform::Constant(v) => v as f64,
        }
    }
}

/// Connector that hands out [`SyntheticSource`]s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConnector {
    waveform: Waveform,
    rate_hz: f64,
    garbage_every: Option<u32>,
    noise_amplitude: f64,
}

impl SyntheticConnector {
    /// Create a connector emitting `waveform` at `rate_hz` lines per second
    pub fn new(waveform: Waveform, rate_hz: f64) -> Self {
        Self {
            waveform,
            rate_hz: rate_hz.max(0.1),
            garbage_every: None,
            noise_amplitude: 0.0,
        }
    }

    /// Emit a non-numeric line after every `n` samples
    pub fn with_garbage_every(mut self, n: u32) -> Self {
        self.garbage_every = (n > 0).then_some(n);
        self
    }

    /// Add uniform noise of the given amplitude
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude.max(0.0);
        self
    }
}

impl Default for SyntheticConnector {
    fn default() -> Self {
        Self::new(Waveform::default(), 100.0)
    }
}

impl DeviceConnector for SyntheticConnector {
    type Source = SyntheticSource;

    fn connect(&self, port: &str, baud_rate: u32) -> Result<SyntheticSource, DeviceError> {
        Ok(SyntheticSource {
            name: format!("synthetic:{} @ {} baud", port, baud_rate),
            config: *self,
            start_time: Instant::now(),
            emitted: 0,
            samples: 0,
            garbage_pending: false,
            rng_state: 0x2545_f491_4f6c_dd1d,
        })
    }
}

/// Simulated sensor
#[derive(Debug)]
pub struct SyntheticSource {
    name: String,
    config: SyntheticConnector,
    start_time: Instant,
    /// Lines emitted, samples and garbage alike
    emitted: u64,
    samples: u64,
    garbage_pending: bool,
    rng_state: u64,
}

impl SyntheticSource {
    fn next_due(&self) -> Instant {
        self.start_time + Duration::from_secs_f64(self.emitted as f64 / self.config.rate_hz)
    }

    /// Simple xorshift, no external dependency
    fn next_noise(&mut self) -> f64 {
        let mut s = self.rng_state;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.rng_state = s;
        (s as f64) / (u64::MAX as f64) - 0.5
    }

    fn next_line(&mut self) -> RawLine {
        self.emitted += 1;

        if self.garbage_pending {
            self.garbage_pending = false;
            return RawLine::from(format!("HR:{:.0} SpO2:98", self.bpm()).as_str());
        }

        let elapsed = self.samples as f64 / self.config.rate_hz;
        let mut value = self.config.waveform.value_at(self.samples, elapsed);
        if self.config.noise_amplitude > 0.0 {
            value += self.next_noise() * 2.0 * self.config.noise_amplitude;
        }
        self.samples += 1;
        if let Some(n) = self.config.garbage_every {
            self.garbage_pending = self.samples % u64::from(n) == 0;
        }
        RawLine::from(format!("{}\r", value.round() as i64).as_str())
    }

    fn bpm(&self) -> f64 {
        match self.config.waveform {
            Waveform::Ppg { bpm, .. } => bpm,
            _ => 0.0,
        }
    }
}

impl LineSource for SyntheticSource {
    fn read_line(&mut self, timeout: Duration) -> Result<RawLine, DeviceError> {
        let now = Instant::now();
        let due = self.next_due();
        if due > now {
            let wait = due - now;
            if wait > timeout {
                std::thread::sleep(timeout);
                return Err(DeviceError::Timeout);
            }
            std::thread::sleep(wait);
        }
        Ok(self.next_line())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    #[test]
    fn test_counter_wraps() {
        let wave = Waveform::Counter {
            step: 1,
            min: 0,
            max: 3,
        };
        let values: Vec<f64> = (0..6).map(|i| wave.value_at(i, 0.0)).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_ppg_stays_above_baseline() {
        let wave = Waveform::default();
        for i in 0..200 {
            let v = wave.value_at(i, i as f64 / 100.0);
            assert!((512.0..=512.0 + 300.0 * 1.4).contains(&v));
        }
    }

    #[test]
    fn test_lines_parse_as_samples() {
        let connector = SyntheticConnector::new(Waveform::Constant(42), 10_000.0);
        let mut source = connector.connect("sim", 9600).unwrap();
        for _ in 0..5 {
            let line = source.read_line(Duration::from_millis(50)).unwrap();
            assert_eq!(parse_line(&line).map(|s| s.value()), Some(42));
        }
    }

    #[test]
    fn test_garbage_interleaved() {
        let connector =
            SyntheticConnector::new(Waveform::Constant(1), 10_000.0).with_garbage_every(2);
        let mut source = connector.connect("sim", 9600).unwrap();
        let parsed: Vec<Option<i64>> = (0..6)
            .map(|_| {
                let line = source.read_line(Duration::from_millis(50)).unwrap();
                parse_line(&line).map(|s| s.value())
            })
            .collect();
        assert_eq!(
            parsed,
            vec![Some(1), Some(1), None, Some(1), Some(1), None]
        );
    }

    #[test]
    fn test_slow_rate_times_out() {
        let connector = SyntheticConnector::new(Waveform::Constant(1), 0.5);
        let mut source = connector.connect("sim", 9600).unwrap();
        // First line is due immediately, the next one two seconds later
        assert!(source.read_line(Duration::from_millis(10)).is_ok());
        assert!(matches!(
            source.read_line(Duration::from_millis(10)),
            Err(DeviceError::Timeout)
        ));
    }
}
