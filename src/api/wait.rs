//! Bounded poll used while waiting for a frame

use std::time::{Duration, Instant};

/// Poll a condition at a fixed interval until it holds or a deadline passes.
///
/// The caller's thread sleeps between checks; there is no way to cancel a
/// wait early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedWait {
    pub interval: Duration,
    pub timeout: Duration,
}

/// How a bounded wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
}

impl BoundedWait {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    /// Check `ready` until it returns `true` or the timeout elapses.
    ///
    /// The condition is always checked at least once. An error from the
    /// condition ends the wait immediately.
    pub fn poll<F, E>(&self, mut ready: F) -> Result<WaitOutcome, E>
    where
        F: FnMut() -> Result<bool, E>,
    {
        let deadline = Instant::now() + self.timeout;

        loop {
            if ready()? {
                return Ok(WaitOutcome::Ready);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }

            std::thread::sleep(self.interval.min(deadline - now));
        }
    }
}

impl Default for BoundedWait {
    fn default() -> Self {
        Self::from_millis(
            crate::core::RECEIVE_POLL_INTERVAL_MS,
            crate::core::RECEIVE_TIMEOUT_MS,
        )
    }
}
