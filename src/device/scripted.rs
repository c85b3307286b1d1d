//! Scripted device for tests
//!
//! A [`ScriptedSource`] replays a fixed sequence of [`ScriptStep`]s, so the
//! recorder can be driven through lines, idle periods and disconnects
//! without hardware.
//!
//! # Example
//!
//! ```ignore
//! use ppg_recorder::device::{ScriptedConnector, ScriptStep};
//!
//! let connector = ScriptedConnector::from_lines(["12", "  34\n", "oops"])
//!     .then(ScriptStep::Disconnect);
//! ```

use crate::error::DeviceError;
use crate::types::RawLine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::source_trait::{DeviceConnector, LineSource};

/// One scripted device event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Deliver a line immediately
    Line(RawLine),
    /// Deliver a line after a delay (a delay past the read timeout is a
    /// timeout, and the line stays queued)
    Delayed(Duration, RawLine),
    /// Stay idle for the full read timeout
    Timeout,
    /// Report the device as gone
    Disconnect,
}

/// What the source does once the script runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptEnd {
    /// Idle forever: every read waits out its timeout
    #[default]
    Idle,
    /// Report a disconnect on every read
    Disconnect,
}

/// Connector that hands out [`ScriptedSource`]s
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    steps: Vec<ScriptStep>,
    end: ScriptEnd,
    unavailable: Option<String>,
    reads: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    /// Create a connector with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connector that delivers each string as one line
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        Self {
            steps: lines
                .into_iter()
                .map(|l| ScriptStep::Line(RawLine::from(l.as_ref())))
                .collect(),
            ..Self::default()
        }
    }

    /// Append a step to the script
    pub fn then(mut self, step: ScriptStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Set what happens once the script runs out
    pub fn with_end(mut self, end: ScriptEnd) -> Self {
        self.end = end;
        self
    }

    /// Make every connect attempt fail with the given reason
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    /// Total reads served by sources from this connector
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of successful connects
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::Relaxed)
    }
}

impl DeviceConnector for ScriptedConnector {
    type Source = ScriptedSource;

    fn connect(&self, port: &str, _baud_rate: u32) -> Result<ScriptedSource, DeviceError> {
        if let Some(ref reason) = self.unavailable {
            return Err(DeviceError::Unavailable {
                port: port.to_string(),
                reason: reason.clone(),
            });
        }
        self.connects.fetch_add(1, Ordering::Relaxed);
        Ok(ScriptedSource {
            name: format!("scripted:{}", port),
            steps: self.steps.iter().cloned().collect(),
            end: self.end,
            reads: Arc::clone(&self.reads),
        })
    }
}

/// Device that replays a script
#[derive(Debug)]
pub struct ScriptedSource {
    name: String,
    steps: VecDeque<ScriptStep>,
    end: ScriptEnd,
    reads: Arc<AtomicUsize>,
}

impl ScriptedSource {
    /// Steps not yet replayed
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self, timeout: Duration) -> Result<RawLine, DeviceError> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        match self.steps.pop_front() {
            Some(ScriptStep::Line(line)) => Ok(line),
            Some(ScriptStep::Delayed(delay, line)) => {
                if delay > timeout {
                    std::thread::sleep(timeout);
                    self.steps
                        .push_front(ScriptStep::Delayed(delay - timeout, line));
                    Err(DeviceError::Timeout)
                } else {
                    std::thread::sleep(delay);
                    Ok(line)
                }
            }
            Some(ScriptStep::Timeout) => {
                std::thread::sleep(timeout);
                Err(DeviceError::Timeout)
            }
            Some(ScriptStep::Disconnect) => {
                Err(DeviceError::Disconnected(format!("{} unplugged", self.name)))
            }
            None => match self.end {
                ScriptEnd::Idle => {
                    std::thread::sleep(timeout);
                    Err(DeviceError::Timeout)
                }
                ScriptEnd::Disconnect => {
                    Err(DeviceError::Disconnected(format!("{} script ended", self.name)))
                }
            },
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
