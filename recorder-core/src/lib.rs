//! # recorder-core
//!
//! Platform-agnostic core of the conference-call recorder.
//!
//! Captures two inputs — a virtual conferencing-app loopback device and a
//! physical microphone — through a platform capture graph, persists the mix
//! as a single stereo file with atomic finalization, and continuously
//! reports device availability and live signal levels to an observer.
//!
//! ## Architecture
//!
//! ```text
//! recorder-core (this crate)
//! ├── traits/       ← DeviceRegistry, CaptureGraph, RecorderObserver, PermissionGate
//! ├── models/       ← RecorderError, SessionState, RecorderConfig, AudioDevice, ...
//! ├── processing/   ← FrameBuffer, level metering
//! ├── catalog       ← device discovery and selection
//! ├── session/      ← CaptureSession (state machine + finalization)
//! ├── monitor/      ← DeviceWatchdog, LevelMonitor
//! └── facade        ← RecordingFacade (the consumed API)
//! ```
//!
//! Platform backends implement `DeviceRegistry` and `CaptureGraph` (see the
//! `recorder-cpal` crate) and plug into `RecordingFacade`.

pub mod catalog;
pub mod facade;
pub mod models;
pub mod monitor;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types at crate root for convenience.
pub use catalog::DeviceCatalog;
pub use facade::RecordingFacade;
pub use models::config::RecorderConfig;
pub use models::device::{AudioDevice, DeviceAvailability, DeviceRole, SharedAvailability};
pub use models::error::RecorderError;
pub use models::levels::{AudioLevelSample, ChannelPowerDb};
pub use models::result::RecordingResult;
pub use models::state::SessionState;
pub use monitor::level::LevelMonitor;
pub use monitor::watchdog::DeviceWatchdog;
pub use session::{CaptureSession, StartCompletion, StopCompletion};
pub use traits::capture_graph::CaptureGraph;
pub use traits::device_registry::DeviceRegistry;
pub use traits::observer::{NullObserver, RecorderObserver};
pub use traits::permission::PermissionGate;
