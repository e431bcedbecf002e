//! In-memory doubles shared across the crate's tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::RecorderConfig;
use crate::models::device::{AudioDevice, DeviceAvailability, DeviceRole};
use crate::models::error::RecorderError;
use crate::models::levels::{AudioLevelSample, ChannelPowerDb};
use crate::models::result::RecordingResult;
use crate::models::state::SessionState;
use crate::traits::capture_graph::CaptureGraph;
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::observer::RecorderObserver;
use crate::traits::permission::PermissionGate;

pub fn loopback_device(name: &str) -> AudioDevice {
    AudioDevice {
        id: name.into(),
        name: name.into(),
        connected: true,
        suspended: false,
        role: DeviceRole::Loopback,
    }
}

pub fn microphone_device(name: &str) -> AudioDevice {
    AudioDevice {
        id: name.into(),
        name: name.into(),
        connected: true,
        suspended: false,
        role: DeviceRole::Microphone,
    }
}

/// Registry double with externally mutable contents.
#[derive(Clone, Default)]
pub struct MockRegistry {
    devices: Arc<Mutex<Vec<AudioDevice>>>,
    default_id: Arc<Mutex<Option<String>>>,
    fail_scans: Arc<AtomicBool>,
}

impl MockRegistry {
    pub fn with_devices(devices: Vec<AudioDevice>) -> Self {
        let registry = Self::default();
        registry.set_devices(devices);
        registry
    }

    pub fn set_devices(&self, devices: Vec<AudioDevice>) {
        *self.devices.lock() = devices;
    }

    pub fn set_default(&self, id: Option<&str>) {
        *self.default_id.lock() = id.map(String::from);
    }

    pub fn set_fail_scans(&self, fail: bool) {
        self.fail_scans.store(fail, Ordering::SeqCst);
    }
}

impl DeviceRegistry for MockRegistry {
    fn scan(&self) -> Result<Vec<AudioDevice>, RecorderError> {
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(RecorderError::ConfigurationFailed("scan failed".into()));
        }
        Ok(self.devices.lock().clone())
    }

    fn default_input_id(&self) -> Option<String> {
        self.default_id.lock().clone()
    }
}

/// Control surface for `MockGraph`, shared with the test body.
#[derive(Default)]
pub struct GraphControl {
    pub bind_fails: AtomicBool,
    pub start_fails: AtomicBool,
    pub finish_fails: AtomicBool,
    pub bound: AtomicBool,
    pub power: Mutex<ChannelPowerDb>,
    writing: Mutex<Option<(PathBuf, File)>>,
}

/// Graph double that writes real bytes to the staging path so finalization
/// has something to promote.
pub struct MockGraph {
    control: Arc<GraphControl>,
}

impl MockGraph {
    pub fn new() -> (Self, Arc<GraphControl>) {
        let control = Arc::new(GraphControl::default());
        (
            Self {
                control: Arc::clone(&control),
            },
            control,
        )
    }
}

impl CaptureGraph for MockGraph {
    fn bind(
        &mut self,
        _loopback: &AudioDevice,
        _microphone: &AudioDevice,
        _config: &RecorderConfig,
    ) -> Result<(), RecorderError> {
        if self.control.bind_fails.load(Ordering::SeqCst) {
            return Err(RecorderError::ConfigurationFailed("bind refused".into()));
        }
        self.control.bound.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unbind(&mut self) {
        self.control.bound.store(false, Ordering::SeqCst);
    }

    fn start_writing(&mut self, staging_path: &Path) -> Result<(), RecorderError> {
        if self.control.start_fails.load(Ordering::SeqCst) {
            return Err(RecorderError::ConfigurationFailed(
                "encoder refused to start".into(),
            ));
        }
        let mut file = File::create(staging_path)
            .map_err(|err| RecorderError::ConfigurationFailed(err.to_string()))?;
        file.write_all(b"RIFF")
            .map_err(|err| RecorderError::ConfigurationFailed(err.to_string()))?;
        *self.control.writing.lock() = Some((staging_path.to_path_buf(), file));
        Ok(())
    }

    fn finish_writing(&mut self) -> Result<(), RecorderError> {
        let writing = self.control.writing.lock().take();
        if self.control.finish_fails.load(Ordering::SeqCst) {
            return Err(RecorderError::FinalizationFailed(
                "encoder confirmation failed".into(),
            ));
        }
        if let Some((_, mut file)) = writing {
            file.write_all(b"data")
                .map_err(|err| RecorderError::FinalizationFailed(err.to_string()))?;
            file.sync_all()
                .map_err(|err| RecorderError::FinalizationFailed(err.to_string()))?;
        }
        Ok(())
    }

    fn channel_power(&self) -> ChannelPowerDb {
        *self.control.power.lock()
    }

    fn container_ext(&self) -> &'static str {
        "wav"
    }
}

/// Observer that records every event for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<SessionState>>,
    pub availability: Mutex<Vec<DeviceAvailability>>,
    pub levels: Mutex<Vec<AudioLevelSample>>,
    pub finished: Mutex<Vec<RecordingResult>>,
}

impl RecorderObserver for RecordingObserver {
    fn on_state_changed(&self, state: SessionState) {
        self.states.lock().push(state);
    }

    fn on_device_availability_changed(&self, availability: DeviceAvailability) {
        self.availability.lock().push(availability);
    }

    fn on_audio_level(&self, sample: AudioLevelSample) {
        self.levels.lock().push(sample);
    }

    fn on_recording_finished(&self, result: &RecordingResult) {
        self.finished.lock().push(result.clone());
    }
}

/// Permission gate with a fixed answer.
pub struct StaticGate(pub bool);

impl PermissionGate for StaticGate {
    fn request_access(&self) -> Result<bool, RecorderError> {
        Ok(self.0)
    }
}

/// `Recording-<YYYYMMDD-HHmmss>.wav`
pub fn is_final_recording_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("Recording-") else {
        return false;
    };
    let Some(stamp) = rest.strip_suffix(".wav") else {
        return false;
    };
    stamp.len() == 15
        && stamp
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 8 { b == b'-' } else { b.is_ascii_digit() })
}

/// Poll until `predicate` holds or the timeout elapses.
pub fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    predicate()
}
