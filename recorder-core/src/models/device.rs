use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Role an input device plays in the capture graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    /// Virtual input carrying another application's output audio.
    Loopback,
    Microphone,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loopback => f.write_str("loopback"),
            Self::Microphone => f.write_str("microphone"),
        }
    }
}

/// Immutable snapshot of an audio input device.
///
/// Device state is externally volatile; consumers re-query the registry
/// rather than watching a snapshot for changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    /// Stable identifier within the registry that produced the snapshot.
    pub id: String,
    pub name: String,
    pub connected: bool,
    pub suspended: bool,
    pub role: DeviceRole,
}

impl AudioDevice {
    /// A device can join the capture graph only while connected and awake.
    pub fn is_usable(&self) -> bool {
        self.connected && !self.suspended
    }
}

/// Availability of the two devices the recorder depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAvailability {
    pub loopback_available: bool,
    pub microphone_available: bool,
}

impl DeviceAvailability {
    pub fn both_available(&self) -> bool {
        self.loopback_available && self.microphone_available
    }
}

/// Process-wide availability cache: refreshed by the watchdog, seeded by a
/// successful configure, read by the session before starting a recording.
pub type SharedAvailability = Arc<Mutex<DeviceAvailability>>;
