//! Periodic device-availability polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::catalog::DeviceCatalog;
use crate::models::device::{DeviceAvailability, SharedAvailability};
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::observer::RecorderObserver;

use super::sleep_while_alive;

/// How often device availability is re-resolved.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Tracks the last published snapshot. Every poll that changes either
/// boolean yields exactly one notification; unchanged polls yield none.
struct AvailabilityTracker {
    last: DeviceAvailability,
}

impl AvailabilityTracker {
    fn new(seed: DeviceAvailability) -> Self {
        Self { last: seed }
    }

    fn observe(&mut self, next: DeviceAvailability) -> Option<DeviceAvailability> {
        if next == self.last {
            None
        } else {
            self.last = next;
            Some(next)
        }
    }
}

/// Polls the catalog on a fixed cadence, refreshes the shared availability
/// cache, and pushes changes to the observer. A failed scan is logged and
/// the tick skipped; the loop never dies on its own.
pub struct DeviceWatchdog {
    alive: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DeviceWatchdog {
    pub fn start<R: DeviceRegistry + 'static>(
        catalog: Arc<DeviceCatalog<R>>,
        cache: SharedAvailability,
        observer: Arc<dyn RecorderObserver>,
    ) -> Self {
        Self::start_with_interval(catalog, cache, observer, POLL_INTERVAL)
    }

    /// Same loop with a caller-chosen cadence; tests shrink the interval.
    pub fn start_with_interval<R: DeviceRegistry + 'static>(
        catalog: Arc<DeviceCatalog<R>>,
        cache: SharedAvailability,
        observer: Arc<dyn RecorderObserver>,
        interval: Duration,
    ) -> Self {
        let alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&alive);

        let handle = thread::Builder::new()
            .name("device-watchdog".into())
            .spawn(move || {
                // The first successful scan seeds the tracker silently;
                // notifications only ever report a change between polls.
                let mut tracker: Option<AvailabilityTracker> = None;
                while flag.load(Ordering::SeqCst) {
                    match catalog.availability() {
                        Ok(next) => {
                            *cache.lock() = next;
                            match tracker.as_mut() {
                                None => tracker = Some(AvailabilityTracker::new(next)),
                                Some(tracker) => {
                                    if let Some(changed) = tracker.observe(next) {
                                        observer.on_device_availability_changed(changed);
                                    }
                                }
                            }
                        }
                        Err(err) => log::warn!("device scan failed, skipping tick: {err}"),
                    }
                    sleep_while_alive(&flag, interval);
                }
            })
            .expect("failed to spawn device watchdog");

        Self {
            alive,
            handle: Some(handle),
        }
    }

    /// Stop the loop and join the thread. Idempotent.
    pub fn stop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DeviceWatchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::testutil::{
        loopback_device, microphone_device, wait_until, MockRegistry, RecordingObserver,
    };

    fn availability(loopback: bool, microphone: bool) -> DeviceAvailability {
        DeviceAvailability {
            loopback_available: loopback,
            microphone_available: microphone,
        }
    }

    #[test]
    fn tracker_fires_only_on_change() {
        // Availability reads true,true,false,false,true → 2 notifications.
        let reads = [true, true, false, false, true];
        let mut tracker = AvailabilityTracker::new(availability(reads[0], true));
        let notifications: Vec<_> = reads[1..]
            .iter()
            .filter_map(|&loopback| tracker.observe(availability(loopback, true)))
            .collect();

        assert_eq!(notifications.len(), 2);
        assert!(!notifications[0].loopback_available);
        assert!(notifications[1].loopback_available);
    }

    #[test]
    fn unchanged_polls_stay_silent() {
        let mut tracker = AvailabilityTracker::new(availability(true, true));
        for _ in 0..10 {
            assert!(tracker.observe(availability(true, true)).is_none());
        }
    }

    #[test]
    fn loop_notifies_on_device_loss_and_return() {
        let registry = MockRegistry::with_devices(vec![
            loopback_device("ZoomAudioDevice"),
            microphone_device("Built-in Microphone"),
        ]);
        let catalog = Arc::new(DeviceCatalog::new(registry.clone()));
        let cache: SharedAvailability = Arc::new(Mutex::new(DeviceAvailability::default()));
        let observer = Arc::new(RecordingObserver::default());
        let mut watchdog = DeviceWatchdog::start_with_interval(
            catalog,
            Arc::clone(&cache),
            observer.clone(),
            Duration::from_millis(10),
        );

        // Seed tick: cache refreshed, no notification.
        assert!(wait_until(Duration::from_secs(2), || cache
            .lock()
            .both_available()));
        assert!(observer.availability.lock().is_empty());

        registry.set_devices(vec![microphone_device("Built-in Microphone")]);
        assert!(wait_until(Duration::from_secs(2), || observer
            .availability
            .lock()
            .len()
            == 1));
        assert!(!observer.availability.lock()[0].loopback_available);

        registry.set_devices(vec![
            loopback_device("ZoomAudioDevice"),
            microphone_device("Built-in Microphone"),
        ]);
        assert!(wait_until(Duration::from_secs(2), || observer
            .availability
            .lock()
            .len()
            == 2));
        assert!(observer.availability.lock()[1].both_available());

        watchdog.stop();
        watchdog.stop();
    }

    #[test]
    fn failed_scans_are_skipped() {
        let registry = MockRegistry::with_devices(vec![
            loopback_device("ZoomAudioDevice"),
            microphone_device("Built-in Microphone"),
        ]);
        let catalog = Arc::new(DeviceCatalog::new(registry.clone()));
        let cache: SharedAvailability = Arc::new(Mutex::new(DeviceAvailability::default()));
        let observer = Arc::new(RecordingObserver::default());
        let mut watchdog = DeviceWatchdog::start_with_interval(
            catalog,
            Arc::clone(&cache),
            observer.clone(),
            Duration::from_millis(10),
        );

        assert!(wait_until(Duration::from_secs(2), || cache
            .lock()
            .both_available()));

        // A failing registry neither notifies nor clears the cache.
        registry.set_fail_scans(true);
        std::thread::sleep(Duration::from_millis(50));
        assert!(cache.lock().both_available());
        assert!(observer.availability.lock().is_empty());

        registry.set_fail_scans(false);
        assert!(wait_until(Duration::from_secs(2), || cache
            .lock()
            .both_available()));

        watchdog.stop();
    }
}
