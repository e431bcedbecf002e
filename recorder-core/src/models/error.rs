use thiserror::Error;

use super::device::DeviceRole;

/// Errors surfaced by the recording subsystem.
///
/// Discovery and configuration errors return synchronously; start/stop
/// errors arrive through the completion callback of the call that caused
/// them. None of these are fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("no usable {0} device found")]
    DeviceNotFound(DeviceRole),

    /// A device resolved at configure time has since disappeared.
    #[error("required audio devices are no longer available")]
    DevicesUnavailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    /// The staging file could not be promoted to its final name. The final
    /// path is guaranteed absent when this is returned.
    #[error("finalization failed: {0}")]
    FinalizationFailed(String),

    #[error("audio capture permission denied")]
    PermissionDenied,
}
