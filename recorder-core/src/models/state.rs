use serde::{Deserialize, Serialize};

/// Capture session state machine.
///
/// ```text
/// idle → configuring → ready → recording → finalizing → idle
///            │                     │            │
///            └────────→ failed ←───┴────────────┘
///                          │
///                        idle
/// ```
///
/// `Configuring`, `Finalizing` and `Failed` are transient: every failure
/// resolves back to `Idle`, leaving the session restartable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Configuring,
    Ready,
    Recording,
    Finalizing,
    Failed,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// A recording operation is in flight (recording or finalizing).
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Recording | Self::Finalizing)
    }
}
