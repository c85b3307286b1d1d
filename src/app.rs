//! Application wiring
//!
//! Composes one recording run: open the device, create the output file,
//! record until the session closes. The device is opened first so that a
//! missing sensor never truncates an existing output file.

use crate::cancel::CancelToken;
use crate::config::RecorderConfig;
use crate::device::{DeviceConnector, DeviceSource};
use crate::error::{Result, ResultExt};
use crate::session::{SessionRecorder, SessionSummary};
use crate::sink::{CsvFileSink, RecordSink};

/// Record one session as described by `config`
///
/// Fails with a device error if the device cannot be opened (no output
/// file is created in that case) or disconnects mid-session, and with a
/// sink error if the output cannot be created or written. A manual stop
/// through `cancel` is a successful run.
pub fn run_recording<C: DeviceConnector>(
    config: &RecorderConfig,
    connector: &C,
    cancel: &CancelToken,
) -> Result<SessionSummary> {
    config.validate()?;

    let device = DeviceSource::open(connector, &config.device_settings())
        .with_context(|| format!("Failed to open {}", config.device.port))?;

    let sink = CsvFileSink::create(&config.output.path)?
        .with_line_ending(config.output.line_ending)
        .with_durability(config.output.durability);

    let settings = config.session_settings()?;
    let mut recorder = SessionRecorder::new(device, RecordSink::new(sink), settings);
    let summary = recorder.run(cancel).context("Recording failed")?;

    tracing::info!(
        samples = summary.stats.samples_recorded,
        discarded = summary.stats.lines_discarded,
        discard_pct = summary.stats.discard_rate(),
        rate_hz = summary.stats.sample_rate_hz(),
        "Saved: {}",
        summary.output
    );
    Ok(summary)
}
