//! Time sources for item timestamps.
//!
//! Stores stamp items with [`Clock::now`]. The conformance suite calls
//! [`Clock::tick`] between writes whose timestamp order it later asserts, so
//! sharing one clock between a store and the suite keeps ordering checks
//! deterministic at one-second resolution.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in Unix seconds.
    fn now(&self) -> i64;

    /// Returns once `now()` reports a later second than before the call.
    fn tick(&self);
}

/// Wall clock. `tick` sleeps past the next second boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or_default()
    }

    fn tick(&self) {
        let start = self.now();
        let into_second = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.subsec_millis())
            .unwrap_or_default();
        thread::sleep(Duration::from_millis(u64::from(1_000 - into_second) + 20));
        while self.now() <= start {
            thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        ManualClock {
            now: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, unix: i64) {
        self.now.store(unix, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.advance(1);
    }
}
