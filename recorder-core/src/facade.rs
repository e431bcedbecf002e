//! The externally consumed recording service.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::DeviceCatalog;
use crate::models::config::RecorderConfig;
use crate::models::device::{AudioDevice, DeviceAvailability, SharedAvailability};
use crate::models::error::RecorderError;
use crate::models::state::SessionState;
use crate::monitor::level::LevelMonitor;
use crate::monitor::watchdog::DeviceWatchdog;
use crate::session::{CaptureSession, StartCompletion, StopCompletion};
use crate::traits::capture_graph::CaptureGraph;
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::observer::RecorderObserver;
use crate::traits::permission::PermissionGate;

/// One-per-process recording service: composes the capture session, the
/// device watchdog, and the level monitor behind a single lifecycle.
pub struct RecordingFacade<R: DeviceRegistry + 'static, G: CaptureGraph + 'static> {
    catalog: Arc<DeviceCatalog<R>>,
    session: Arc<CaptureSession<G>>,
    availability: SharedAvailability,
    watchdog: DeviceWatchdog,
    monitor: LevelMonitor,
}

impl<R: DeviceRegistry + 'static, G: CaptureGraph + 'static> RecordingFacade<R, G> {
    /// Resolve capture permission, bind the session, and start the
    /// monitoring loops.
    ///
    /// A denied permission is terminal — the facade is not built and the
    /// caller gets `PermissionDenied`. A missing device is not: the
    /// configure failure is logged, the watchdog keeps reporting, and
    /// `start` retries the configure step once the device reappears.
    pub fn new(
        registry: R,
        graph: G,
        permissions: &dyn PermissionGate,
        config: RecorderConfig,
        observer: Arc<dyn RecorderObserver>,
    ) -> Result<Self, RecorderError> {
        if !permissions.request_access()? {
            return Err(RecorderError::PermissionDenied);
        }

        let catalog = Arc::new(DeviceCatalog::new(registry));
        let availability: SharedAvailability = Arc::new(Mutex::new(DeviceAvailability::default()));
        let session = Arc::new(CaptureSession::new(
            graph,
            config,
            Arc::clone(&availability),
            Arc::clone(&observer),
        ));

        if let Err(err) = session.configure(catalog.as_ref()) {
            log::warn!("initial configure failed, will retry on start: {err}");
        }

        let watchdog = DeviceWatchdog::start(
            Arc::clone(&catalog),
            Arc::clone(&availability),
            Arc::clone(&observer),
        );
        let monitor = LevelMonitor::start(Arc::clone(&session), observer);

        Ok(Self {
            catalog,
            session,
            availability,
            watchdog,
            monitor,
        })
    }

    /// Begin a recording; the completion fires once the encoder confirms.
    /// An idle (unconfigured) session is configured first, so a device that
    /// reappeared since the last failure is picked up here.
    pub fn start(&self, completion: StartCompletion) {
        if self.session.state().is_idle() {
            if let Err(err) = self.session.configure(self.catalog.as_ref()) {
                completion(Err(err));
                return;
            }
        }
        self.session.start(completion);
    }

    /// Stop the active recording and finalize its file.
    pub fn stop(&self, completion: StopCompletion) {
        self.session.stop(completion);
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Latest watchdog-refreshed device availability.
    pub fn availability(&self) -> DeviceAvailability {
        *self.availability.lock()
    }

    /// Full device snapshot, for diagnostics.
    pub fn list_devices(&self) -> Result<Vec<AudioDevice>, RecorderError> {
        self.catalog.list_devices()
    }

    /// Stop the monitoring loops and force the session back to idle.
    /// Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        self.monitor.stop();
        self.watchdog.stop();
        self.session.teardown();
    }
}

impl<R: DeviceRegistry + 'static, G: CaptureGraph + 'static> Drop for RecordingFacade<R, G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
