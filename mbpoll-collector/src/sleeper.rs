//! Sleep abstraction for testable poll loops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trait for waiting between poll cycles.
pub trait Sleeper: Send + Sync {
    /// Sleep for the specified number of seconds.
    fn sleep_sec(&self, seconds: u64);
}

/// Real sleeper that uses `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl RealSleeper {
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for RealSleeper {
    fn sleep_sec(&self, seconds: u64) {
        std::thread::sleep(Duration::from_secs(seconds));
    }
}

/// Mock sleeper for testing: returns immediately and counts the seconds
/// it was asked to sleep.
#[derive(Debug, Default)]
pub struct MockSleeper {
    slept: AtomicU64,
    calls: AtomicU64,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total seconds requested so far.
    pub fn total_slept(&self) -> u64 {
        self.slept.load(Ordering::SeqCst)
    }

    /// Number of `sleep_sec` calls so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sleeper for MockSleeper {
    fn sleep_sec(&self, seconds: u64) {
        self.slept.fetch_add(seconds, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
