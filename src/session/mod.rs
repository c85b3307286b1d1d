//! Recording sessions
//!
//! A session is one bounded run of the acquisition loop, from an open
//! device to a closed output file. It is `Active` from construction and
//! moves to `Closed` exactly once, when the recording window elapses, a
//! manual stop is observed, or the device or output fails.
//!
//! # Main Types
//!
//! - [`SessionRecorder`] - owns the device and sink, drives the loop
//! - [`SessionSettings`] - recording window and read timeout
//! - [`SessionSummary`] - what happened, for logs and `--summary` files
//! - [`SessionStats`] - line/sample counters

pub mod recorder;
pub mod stats;
pub mod types;

pub use recorder::SessionRecorder;
pub use stats::SessionStats;
pub use types::{
    SessionOutcome, SessionSettings, SessionState, SessionSummary, DEFAULT_READ_TIMEOUT,
    DEFAULT_SESSION_DURATION,
};
