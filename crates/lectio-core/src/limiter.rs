//! Minimum-interval pacing for outbound requests

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between request dispatches.
///
/// One value is constructed per run and injected into the fetcher; there is
/// no hidden global last-request state. `acquire` blocks the caller until
/// the interval since the previous `acquire` returned has elapsed. Callers
/// are served in lock-acquisition order; no other fairness is guaranteed.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Block until at least `interval` has passed since the last dispatch.
    pub fn acquire(&self) {
        let mut last = self.last_dispatch.lock().expect("limiter lock poisoned");
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
