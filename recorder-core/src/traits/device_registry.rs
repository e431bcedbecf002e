use crate::models::device::AudioDevice;
use crate::models::error::RecorderError;

/// Read-only window onto the OS audio-input registry.
///
/// Implementations query the platform at call time. Device state is
/// externally volatile, so nothing here caches — staleness is handled by
/// re-scanning, not by observing in-place changes.
pub trait DeviceRegistry: Send + Sync {
    /// Snapshot of the currently known input devices.
    fn scan(&self) -> Result<Vec<AudioDevice>, RecorderError>;

    /// Identifier of the platform default input device, if one is set.
    fn default_input_id(&self) -> Option<String>;
}
