//! Time Sources
//!
//! The motion scheduler never reads the system clock directly. It is handed
//! a [`Clock`] so tests can drive time by hand and so a long suspension
//! (a backgrounded terminal, a paused field) is just another clamped `dt`.
//!
//! The reveal gate of the in-memory backend needs calendar time rather than
//! monotonic time; that is what [`Calendar`] is for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for deterministic tests and replays
///
/// Clones share the same timeline, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at an arbitrary origin
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Time elapsed since the origin
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Wall-calendar time source (server local time)
pub trait Calendar: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// The system's local calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A calendar that reads from a shared, settable timestamp
#[derive(Debug, Clone)]
pub struct FixedCalendar {
    now: Arc<parking_lot::RwLock<NaiveDateTime>>,
}

impl FixedCalendar {
    /// Create a calendar stopped at `now`
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(parking_lot::RwLock::new(now)),
        }
    }

    /// Jump to another moment
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.write() = now;
    }

    /// Move forward by a chrono duration
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Calendar for FixedCalendar {
    fn now(&self) -> NaiveDateTime {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_timeline() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - start, Duration::from_millis(250));
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn test_manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_fixed_calendar() {
        let start = NaiveDateTime::parse_from_str("2024-05-01 09:59:59", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let cal = FixedCalendar::new(start);
        cal.advance(chrono::Duration::seconds(1));
        assert_eq!(cal.now().format("%H:%M:%S").to_string(), "10:00:00");
    }
}
