//! Session recorder: the time-boxed acquisition loop
//!
//! Each iteration checks for a manual stop and for the end of the recording
//! window before it reads, so the session can never block past its bound
//! waiting on a quiet device. Reads are clamped to the time remaining.
//!
//! A line whose read completes after the bound is dropped, even if it
//! decodes. Accepted samples are appended and synced before the next read.

use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::device::{DeviceSource, LineSource};
use crate::error::{SessionError, SinkError};
use crate::parser::parse_line;
use crate::sink::{RecordSink, SampleSink};

use super::stats::SessionStats;
use super::types::{SessionOutcome, SessionSettings, SessionState, SessionSummary};

/// Records one bounded session from a device into a sink
#[derive(Debug)]
pub struct SessionRecorder<S: LineSource, W: SampleSink> {
    device: DeviceSource<S>,
    sink: RecordSink<W>,
    settings: SessionSettings,
    state: SessionState,
    start_time: Instant,
    started_at: chrono::DateTime<chrono::Utc>,
    /// Set on close
    elapsed_at_close: Option<Duration>,
    outcome: Option<SessionOutcome>,
    stats: SessionStats,
}

impl<S: LineSource, W: SampleSink> SessionRecorder<S, W> {
    /// Start a session; the recording window begins now
    pub fn new(device: DeviceSource<S>, sink: RecordSink<W>, settings: SessionSettings) -> Self {
        tracing::info!(
            "Recording for {:.1} seconds...",
            settings.duration.as_secs_f64()
        );
        Self {
            device,
            sink,
            settings,
            state: SessionState::Active,
            start_time: Instant::now(),
            started_at: chrono::Utc::now(),
            elapsed_at_close: None,
            outcome: None,
            stats: SessionStats::default(),
        }
    }

    /// Run until the window elapses, `cancel` fires, or a fatal error
    ///
    /// On every exit path the session is closed and both resources are
    /// released before this returns. Calling `run` on a closed session
    /// returns its summary again without reading.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<SessionSummary, SessionError> {
        while self.state.is_active() {
            match self.step(cancel) {
                Ok(Some(outcome)) => {
                    self.finish(outcome).map_err(SessionError::Sink)?;
                }
                Ok(None) => {}
                Err(e) => {
                    let outcome = match e {
                        SessionError::Device(_) => SessionOutcome::Disconnected,
                        SessionError::Sink(_) => SessionOutcome::SinkFailed,
                    };
                    tracing::error!("Recording aborted: {}", e);
                    if let Err(close_err) = self.finish(outcome) {
                        tracing::warn!("Failed to finish output: {}", close_err);
                    }
                    return Err(e);
                }
            }
        }
        Ok(self.summary())
    }

    /// One loop iteration
    ///
    /// Returns `Some(outcome)` when the session should close.
    fn step(&mut self, cancel: &CancelToken) -> Result<Option<SessionOutcome>, SessionError> {
        if cancel.is_cancelled() {
            return Ok(Some(SessionOutcome::Cancelled));
        }

        let elapsed = self.start_time.elapsed();
        let Some(remaining) = self.settings.duration.checked_sub(elapsed).filter(|r| !r.is_zero())
        else {
            return Ok(Some(SessionOutcome::Completed));
        };

        let line = match self.device.read_line(self.settings.read_timeout.min(remaining)) {
            Ok(line) => line,
            Err(e) if e.is_recoverable() => {
                self.stats.record_timeout();
                tracing::trace!("No data this cycle");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        self.stats.record_line(line.len());

        let offset = self.start_time.elapsed();
        if offset >= self.settings.duration {
            self.stats.record_late_drop();
            tracing::debug!(line = %line, "Line arrived after the recording window, dropped");
            return Ok(Some(SessionOutcome::Completed));
        }

        match parse_line(&line) {
            Some(sample) => {
                self.sink.append(sample)?;
                self.stats.record_sample(sample, offset);
                tracing::info!(value = sample.value(), "{}", sample);
            }
            None => {
                self.stats.record_discard();
                tracing::trace!(line = %line, "Discarded line");
            }
        }
        Ok(None)
    }

    /// Transition to `Closed` and release both resources
    ///
    /// Only the first call has any effect.
    fn finish(&mut self, outcome: SessionOutcome) -> Result<(), SinkError> {
        if !self.state.is_active() {
            return Ok(());
        }
        self.state = SessionState::Closed;
        self.outcome = Some(outcome);
        let elapsed = self.start_time.elapsed();
        self.elapsed_at_close = Some(elapsed);

        self.device.close();
        let finished = self.sink.close().map(|_| ());

        match outcome {
            SessionOutcome::Completed => tracing::info!(
                samples = self.stats.samples_recorded,
                "{:.0} seconds completed.",
                self.settings.duration.as_secs_f64()
            ),
            SessionOutcome::Cancelled => tracing::info!(
                samples = self.stats.samples_recorded,
                "Stopped manually after {:.1} seconds.",
                elapsed.as_secs_f64()
            ),
            SessionOutcome::Disconnected | SessionOutcome::SinkFailed => tracing::warn!(
                samples = self.stats.samples_recorded,
                "Session ended early: {}",
                outcome
            ),
        }

        finished
    }

    /// Close the session now, as a manual stop
    ///
    /// Safe to call more than once and after `run` returned.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.finish(SessionOutcome::Cancelled)
            .map_err(SessionError::Sink)
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Why the session closed, once it has
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Counters so far
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Time since the session started, frozen at close
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at_close
            .unwrap_or_else(|| self.start_time.elapsed())
    }

    /// The device handle
    pub fn device_mut(&mut self) -> &mut DeviceSource<S> {
        &mut self.device
    }

    /// The output handle
    pub fn sink_mut(&mut self) -> &mut RecordSink<W> {
        &mut self.sink
    }

    /// Report of the session so far
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            outcome: self.outcome.unwrap_or(SessionOutcome::Cancelled),
            started_at: self.started_at,
            duration: self.settings.duration,
            elapsed: self.elapsed(),
            device: self.device.description().to_string(),
            output: self.sink.description().to_string(),
            stats: self.stats.clone(),
        }
    }
}
