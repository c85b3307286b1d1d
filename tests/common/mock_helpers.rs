//! Mock construction helpers

use ppg_recorder::device::{DeviceSettings, DeviceSource, ScriptedConnector, ScriptedSource};
use ppg_recorder::session::{SessionRecorder, SessionSettings};
use ppg_recorder::sink::{MemorySink, RecordSink};
use std::time::Duration;

/// Session over a scripted device and an in-memory sink
pub fn scripted_session(
    connector: &ScriptedConnector,
    duration: Duration,
    read_timeout: Duration,
) -> (SessionRecorder<ScriptedSource, MemorySink>, MemorySink) {
    let device = DeviceSource::open(connector, &DeviceSettings::new("scripted", 9600))
        .expect("scripted connector opens");
    let memory = MemorySink::new();
    let recorder = SessionRecorder::new(
        device,
        RecordSink::new(memory.clone()),
        SessionSettings::new(duration).with_read_timeout(read_timeout),
    );
    (recorder, memory)
}
