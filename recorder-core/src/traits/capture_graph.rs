use std::path::Path;

use crate::models::config::RecorderConfig;
use crate::models::device::AudioDevice;
use crate::models::error::RecorderError;
use crate::models::levels::ChannelPowerDb;

/// The platform capture pipeline: two bound inputs feeding one encoder
/// output.
///
/// Owned and mutated exclusively by `CaptureSession`; the monitoring loops
/// only read `channel_power`. `bind` must be all-or-nothing — on failure no
/// partial input may stay attached — and a previously bound graph must
/// accept a later re-bind.
pub trait CaptureGraph: Send {
    /// Attach both inputs and the encoder output.
    fn bind(
        &mut self,
        loopback: &AudioDevice,
        microphone: &AudioDevice,
        config: &RecorderConfig,
    ) -> Result<(), RecorderError>;

    /// Detach all inputs and release the encoder. Safe when nothing is
    /// bound.
    fn unbind(&mut self);

    /// Begin encoding to `staging_path`. Returns only once the encoder has
    /// confirmed it is writing.
    fn start_writing(&mut self, staging_path: &Path) -> Result<(), RecorderError>;

    /// Stop encoding, flush, and fully close the staging file before
    /// returning.
    fn finish_writing(&mut self) -> Result<(), RecorderError>;

    /// Latest per-role average power, for level metering.
    fn channel_power(&self) -> ChannelPowerDb;

    /// Container extension for files this graph produces (e.g. "wav").
    fn container_ext(&self) -> &'static str;
}
