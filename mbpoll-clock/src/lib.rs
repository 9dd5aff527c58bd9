//! Clock abstraction for mbpoll.
//!
//! Provides a trait for reading the current UTC time, with real and mock
//! implementations so that timestamped rows can be tested deterministically.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Trait for getting the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current time rendered as an RFC 3339 cell, e.g. `2024-01-01T00:00:00Z`.
    fn timestamp_cell(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Real system clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for testing with a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    timestamp: i64,
}

impl MockClock {
    /// Create a mock clock pinned to `timestamp` Unix seconds.
    pub fn new(timestamp: i64) -> Self {
        Self { timestamp }
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        from_unix(self.timestamp)
    }
}

/// Mock clock that advances by a fixed step on each call.
///
/// Useful for checking that consecutive poll cycles get distinct timestamps.
#[derive(Debug)]
pub struct AdvancingClock {
    timestamp: AtomicI64,
    increment: i64,
}

impl AdvancingClock {
    /// Create an advancing clock starting at `timestamp` and moving `increment` seconds per call.
    pub fn new(timestamp: i64, increment: i64) -> Self {
        Self {
            timestamp: AtomicI64::new(timestamp),
            increment,
        }
    }
}

impl Clock for AdvancingClock {
    fn now(&self) -> DateTime<Utc> {
        from_unix(self.timestamp.fetch_add(self.increment, Ordering::SeqCst))
    }
}

fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_returns_fixed_time() {
        let clock = MockClock::new(1_704_067_200);
        assert_eq!(clock.now().timestamp(), 1_704_067_200);
        assert_eq!(clock.now().timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_timestamp_cell_is_rfc3339_utc() {
        let clock = MockClock::new(1_704_067_200);
        assert_eq!(clock.timestamp_cell(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_timestamp_cell_has_no_commas() {
        // Cells are joined with commas, so the time format must never add one.
        let clock = MockClock::new(1_234_567_890);
        assert!(!clock.timestamp_cell().contains(','));
    }

    #[test]
    fn test_mock_clock_out_of_range_falls_back_to_epoch() {
        let clock = MockClock::new(i64::MAX);
        assert_eq!(clock.now(), DateTime::<Utc>::default());
    }

    #[test]
    fn test_system_clock_returns_reasonable_time() {
        let now = SystemClock.now().timestamp();

        // After 2020-01-01 and before 2100-01-01
        assert!(now > 1_577_836_800);
        assert!(now < 4_102_444_800);
    }

    #[test]
    fn test_advancing_clock_increments() {
        let clock = AdvancingClock::new(1000, 5);
        assert_eq!(clock.now().timestamp(), 1000);
        assert_eq!(clock.now().timestamp(), 1005);
        assert_eq!(clock.timestamp_cell(), "1970-01-01T00:16:50Z");
    }

    #[test]
    fn test_clock_trait_object() {
        let mock: Box<dyn Clock> = Box::new(MockClock::new(0));
        assert_eq!(mock.timestamp_cell(), "1970-01-01T00:00:00Z");
    }
}
