pub mod level;
pub mod watchdog;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Sleep slice between liveness checks, so stopping a loop never has to
/// wait out a full poll interval.
const LIVENESS_SLICE: Duration = Duration::from_millis(50);

/// Sleep for `total`, waking early as soon as `alive` clears.
pub(crate) fn sleep_while_alive(alive: &AtomicBool, total: Duration) {
    let mut remaining = total;
    while alive.load(Ordering::SeqCst) && !remaining.is_zero() {
        let slice = remaining.min(LIVENESS_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}
