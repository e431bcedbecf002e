//! Live audio level sampling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::levels::AudioLevelSample;
use crate::session::CaptureSession;
use crate::traits::capture_graph::CaptureGraph;
use crate::traits::observer::RecorderObserver;

use super::sleep_while_alive;

/// How often channel power is sampled while recording.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Samples per-role power from the session on a fixed cadence and pushes an
/// `AudioLevelSample` to the observer on every tick while a recording is
/// active — silence included, so meters decay instead of freezing. The loop
/// itself runs for the facade's lifetime; outside of recording it only
/// checks state.
pub struct LevelMonitor {
    alive: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LevelMonitor {
    pub fn start<G: CaptureGraph + 'static>(
        session: Arc<CaptureSession<G>>,
        observer: Arc<dyn RecorderObserver>,
    ) -> Self {
        Self::start_with_interval(session, observer, SAMPLE_INTERVAL)
    }

    /// Same loop with a caller-chosen cadence; tests shrink the interval.
    pub fn start_with_interval<G: CaptureGraph + 'static>(
        session: Arc<CaptureSession<G>>,
        observer: Arc<dyn RecorderObserver>,
        interval: Duration,
    ) -> Self {
        let alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&alive);

        let handle = thread::Builder::new()
            .name("level-monitor".into())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    if let Some(power) = session.current_power() {
                        observer.on_audio_level(AudioLevelSample::from_power(power));
                    }
                    sleep_while_alive(&flag, interval);
                }
            })
            .expect("failed to spawn level monitor");

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

impl Drop for LevelMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
