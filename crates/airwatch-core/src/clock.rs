//! Time sources for the engine.

use std::fmt;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

/// Supplies the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in UTC.
    fn now_utc(&self) -> OffsetDateTime;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to a specific instant.
    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock forward.
    pub fn advance(&self, by: time::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.saturating_add(by);
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let start = OffsetDateTime::UNIX_EPOCH;
        let clock = ManualClock::new(start);
        assert_eq!(clock.now_utc(), start);

        clock.advance(time::Duration::seconds(29));
        assert_eq!(clock.now_utc(), start + time::Duration::seconds(29));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(OffsetDateTime::UNIX_EPOCH);
        let other = clock.clone();
        clock.advance(time::Duration::minutes(1));
        assert_eq!(other.now_utc(), clock.now_utc());
    }

    #[test]
    fn test_system_clock_is_utc() {
        let now = SystemClock.now_utc();
        assert!(now.offset().is_utc());
    }
}
