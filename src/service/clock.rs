//! Sources of "now" for the attendance recorder and the payroll service.

use std::sync::{Mutex, PoisonError};

use chrono::{FixedOffset, NaiveDateTime, SubsecRound, TimeDelta, Utc};

use crate::config::ConfigLoader;

/// Supplies the current local wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> NaiveDateTime;
}

/// The system clock viewed at a fixed UTC offset.
///
/// Readings are truncated to whole milliseconds, the resolution the stores
/// keep, so a timestamp returned to a caller equals the one persisted.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Creates a clock at the given offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a clock at the configured site offset.
    pub fn from_config(loader: &ConfigLoader) -> Self {
        Self::new(loader.utc_offset())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now()
            .with_timezone(&self.offset)
            .naive_local()
            .trunc_subsecs(3)
    }
}

/// A clock that only moves when told to.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use dtr_payroll::service::{Clock, ManualClock};
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 15)
///     .unwrap()
///     .and_hms_opt(8, 0, 0)
///     .unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(TimeDelta::hours(4));
///
/// assert_eq!(clock.now(), start + TimeDelta::hours(4));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
