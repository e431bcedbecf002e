//! Device discovery and selection.

use crate::models::device::{AudioDevice, DeviceAvailability, DeviceRole};
use crate::models::error::RecorderError;
use crate::traits::device_registry::DeviceRegistry;

/// Name fragments that mark a virtual loopback / application-audio device.
const LOOPBACK_NAME_HINTS: &[&str] = &["zoom", "loopback", "app audio", "application audio"];

/// Classify a device by name. Registries use this so every snapshot carries
/// a consistent role.
pub fn classify_role(name: &str) -> DeviceRole {
    let lower = name.to_lowercase();
    if LOOPBACK_NAME_HINTS.iter().any(|hint| lower.contains(hint)) {
        DeviceRole::Loopback
    } else {
        DeviceRole::Microphone
    }
}

/// Pure query layer over a `DeviceRegistry`.
///
/// Every call re-scans the registry; device state is externally volatile so
/// there is nothing worth caching here.
pub struct DeviceCatalog<R: DeviceRegistry> {
    registry: R,
}

impl<R: DeviceRegistry> DeviceCatalog<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// First usable loopback-class device.
    pub fn find_loopback(&self) -> Result<AudioDevice, RecorderError> {
        self.registry
            .scan()?
            .into_iter()
            .find(|d| d.role == DeviceRole::Loopback && d.is_usable())
            .ok_or(RecorderError::DeviceNotFound(DeviceRole::Loopback))
    }

    /// The platform default input when it is a usable microphone, otherwise
    /// the first usable microphone-class device.
    pub fn default_microphone(&self) -> Result<AudioDevice, RecorderError> {
        let devices = self.registry.scan()?;

        if let Some(default_id) = self.registry.default_input_id() {
            if let Some(device) = devices.iter().find(|d| d.id == default_id) {
                if device.role == DeviceRole::Microphone && device.is_usable() {
                    return Ok(device.clone());
                }
            }
        }

        devices
            .into_iter()
            .find(|d| d.role == DeviceRole::Microphone && d.is_usable())
            .ok_or(RecorderError::DeviceNotFound(DeviceRole::Microphone))
    }

    /// Full snapshot, for diagnostics.
    pub fn list_devices(&self) -> Result<Vec<AudioDevice>, RecorderError> {
        self.registry.scan()
    }

    /// Both availability booleans resolved from a single scan, so one
    /// failed poll never reads as "both devices vanished".
    pub fn availability(&self) -> Result<DeviceAvailability, RecorderError> {
        let devices = self.registry.scan()?;
        Ok(DeviceAvailability {
            loopback_available: devices
                .iter()
                .any(|d| d.role == DeviceRole::Loopback && d.is_usable()),
            microphone_available: devices
                .iter()
                .any(|d| d.role == DeviceRole::Microphone && d.is_usable()),
        })
    }
}
