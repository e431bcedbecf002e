//! # recorder-cpal
//!
//! Cross-platform cpal backend for `recorder-core`.
//!
//! Provides:
//! - `CpalDeviceRegistry` — input-device enumeration over the default host
//! - `CpalCaptureGraph` — loopback + microphone input streams mixed into one
//!   interleaved stereo WAV
//! - `SystemPermissionGate` — capture-permission probe
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//!
//! use recorder_core::{NullObserver, RecorderConfig, RecordingFacade};
//! use recorder_cpal::{CpalCaptureGraph, CpalDeviceRegistry, SystemPermissionGate};
//!
//! let facade = RecordingFacade::new(
//!     CpalDeviceRegistry::new(),
//!     CpalCaptureGraph::new(),
//!     &SystemPermissionGate,
//!     RecorderConfig::new("recordings"),
//!     Arc::new(NullObserver),
//! )?;
//! ```

mod graph;
mod mix;
mod permission;
mod registry;

pub use graph::CpalCaptureGraph;
pub use permission::SystemPermissionGate;
pub use registry::CpalDeviceRegistry;
