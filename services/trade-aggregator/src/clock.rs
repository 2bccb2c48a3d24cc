//! Time source abstraction
//!
//! The aggregator never calls the wall clock directly; it goes through an
//! injected [`TimeProvider`] so tests can freeze and advance time without
//! touching any other component.

use std::sync::atomic::{AtomicI64, Ordering};
use stocks_common::Ts;

/// Supplies the current instant
pub trait TimeProvider: Send + Sync {
    /// Current timestamp in milliseconds since UNIX epoch
    fn now(&self) -> Ts;
}

/// Wall-clock time provider used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeProvider for SystemClock {
    fn now(&self) -> Ts {
        Ts::now()
    }
}

/// Deterministic time provider for tests: set once, advance explicitly
#[derive(Debug)]
pub struct ManualClock {
    now_millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at the given instant
    #[must_use]
    pub fn new(start: Ts) -> Self {
        Self {
            now_millis: AtomicI64::new(start.as_millis()),
        }
    }

    /// Move the clock forward by `millis`
    pub fn advance_millis(&self, millis: i64) {
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute instant
    pub fn set(&self, now: Ts) {
        self.now_millis.store(now.as_millis(), Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn now(&self) -> Ts {
        Ts::from_millis(self.now_millis.load(Ordering::SeqCst))
    }
}
