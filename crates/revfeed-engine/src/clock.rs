//! Time source for the batch budget

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source consulted at item boundaries
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests
///
/// Time only moves through [`ManualClock::advance`], or by a fixed step on
/// every [`Clock::now`] call when built with [`ManualClock::stepping`].
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_ms: AtomicU64,
    step_ms: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: AtomicU64::new(0),
            step_ms: 0,
        }
    }

    /// Clock that moves forward by `step` after each reading
    pub fn stepping(step: Duration) -> Self {
        Self {
            step_ms: step.as_millis() as u64,
            ..Self::new()
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset_ms.fetch_add(self.step_ms, Ordering::SeqCst);
        self.base + Duration::from_millis(offset)
    }
}
