//! Time sources and calendar helpers
//!
//! Services never call `Utc::now()` directly. Each one owns a [`Clock`] so
//! tests can freeze or advance time deterministically.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Date overflow adding {years} years to {start}")]
    Overflow {
        start: String,
        years: u32,
    },
}

/// A source of the current instant
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Clock handle shared between services
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by `Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Returns the system clock as a shared handle
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually controlled clock for tests and replays
///
/// Clones share the same instant, so a test can keep one handle and hand
/// another to the services under test.
///
/// # Example
///
/// ```rust
/// use core_kernel::{Clock, FixedClock};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
/// clock.advance(Duration::hours(25));
/// assert_eq!(clock.now(), Utc.with_ymd_and_hms(2025, 1, 2, 1, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(at)),
        }
    }

    /// Moves the clock to the given instant
    pub fn set(&self, at: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = at;
    }

    /// Moves the clock forward by the given duration
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    /// Returns this clock as a shared handle
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Adds whole calendar years to an instant
///
/// A Feb 29 start rolls forward to Mar 1 in a non-leap target year,
/// keeping the time of day.
pub fn add_years(start: DateTime<Utc>, years: u32) -> Result<DateTime<Utc>, TemporalError> {
    let overflow = || TemporalError::Overflow {
        start: start.to_rfc3339(),
        years,
    };

    let end = years
        .checked_mul(12)
        .and_then(|months| start.checked_add_months(Months::new(months)))
        .ok_or_else(overflow)?;

    // chrono clamps to the last day of the month
    if end.day() != start.day() {
        return end.checked_add_signed(Duration::days(1)).ok_or_else(overflow);
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_clones_share_time() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        let handle = clock.shared();
        clock.advance(Duration::days(1));
        assert_eq!(handle.now(), Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_add_years_keeps_time_of_day() {
        let start = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
        let end = add_years(start, 10).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2035, 6, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_add_years_from_leap_day() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(add_years(start, 10).unwrap(), Utc.with_ymd_and_hms(2034, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(add_years(start, 1).unwrap(), Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(add_years(start, 4).unwrap(), Utc.with_ymd_and_hms(2028, 2, 29, 12, 0, 0).unwrap());
    }
}
