//! Cooperative shutdown for the poll loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity at which a sleeping poll loop notices shutdown.
const WAKE_INTERVAL: Duration = Duration::from_millis(100);

/// Token for cooperative shutdown of the poll loop.
///
/// Clone is cheap and shares state; signal handlers hold one clone, the loop
/// another.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Sleep for up to `duration`, returning early if shutdown is requested.
    ///
    /// Returns `true` when shutdown was requested.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_requested() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(WAKE_INTERVAL.min(deadline - now));
        }
    }
}
