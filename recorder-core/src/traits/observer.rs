use crate::models::device::DeviceAvailability;
use crate::models::levels::AudioLevelSample;
use crate::models::result::RecordingResult;
use crate::models::state::SessionState;

/// Event sink for the presentation layer.
///
/// Callbacks fire on worker and monitor threads, never on the caller's
/// thread; implementations marshal to their UI thread as needed. All
/// methods default to no-ops so observers subscribe only to what they
/// render.
pub trait RecorderObserver: Send + Sync {
    fn on_state_changed(&self, _state: SessionState) {}

    /// Fired when a watchdog poll detects that either device appeared or
    /// disappeared. Carries the full snapshot, not a diff.
    fn on_device_availability_changed(&self, _availability: DeviceAvailability) {}

    /// Fired on every monitor tick while a recording is active.
    fn on_audio_level(&self, _sample: AudioLevelSample) {}

    /// Fired once the output file is atomically in place.
    fn on_recording_finished(&self, _result: &RecordingResult) {}
}

/// Observer that discards every event.
pub struct NullObserver;

impl RecorderObserver for NullObserver {}
