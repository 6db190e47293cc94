//! Day-type classification.

use crate::core::{Clock, DayType};
use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Weekday};

/// Classifies a point in time as a weekday (Mon-Fri) or weekend (Sat-Sun).
///
/// The day is taken in the timezone carried by `now`.
pub fn classify<Tz: TimeZone>(now: &DateTime<Tz>) -> DayType {
    match now.weekday() {
        Weekday::Sat | Weekday::Sun => DayType::Weekend,
        _ => DayType::Weekday,
    }
}

/// A `Clock` backed by the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A `Clock` that always reports the same instant.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

#[cfg(any(test, feature = "test-utils"))]
impl FixedClock {
    /// Parses an RFC 3339 timestamp, panicking on bad input.
    pub fn at(rfc3339: &str) -> Self {
        Self(DateTime::parse_from_rfc3339(rfc3339).expect("valid RFC 3339 timestamp"))
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
