//! Input-device registry over the cpal host.

use cpal::traits::{DeviceTrait, HostTrait};

use recorder_core::catalog::classify_role;
use recorder_core::{AudioDevice, DeviceRegistry, RecorderError};

/// `DeviceRegistry` backed by the default cpal host.
///
/// cpal exposes no stable device identifier, so the device name doubles as
/// the id; selection and availability checks re-resolve by name. Each call
/// queries the host afresh — device state is volatile and never cached.
#[derive(Debug, Default)]
pub struct CpalDeviceRegistry;

impl CpalDeviceRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceRegistry for CpalDeviceRegistry {
    fn scan(&self) -> Result<Vec<AudioDevice>, RecorderError> {
        let host = cpal::default_host();
        let devices = host.input_devices().map_err(|err| {
            RecorderError::ConfigurationFailed(format!("device enumeration failed: {err}"))
        })?;

        let mut snapshot = Vec::new();
        for device in devices {
            let Ok(name) = device.name() else { continue };
            // An enumerated device is connected; one that cannot produce an
            // input config is reported as suspended.
            let suspended = device.default_input_config().is_err();
            snapshot.push(AudioDevice {
                id: name.clone(),
                role: classify_role(&name),
                name,
                connected: true,
                suspended,
            });
        }
        Ok(snapshot)
    }

    fn default_input_id(&self) -> Option<String> {
        cpal::default_host()
            .default_input_device()
            .and_then(|device| device.name().ok())
    }
}
