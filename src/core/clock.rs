//! Time source for the engine.
//!
//! "Today" is the calendar date in a fixed UTC offset so the day boundary
//! is stable regardless of the host timezone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Calendar day of `instant` as seen from `offset_minutes` east of UTC.
pub fn local_date(instant: DateTime<Utc>, offset_minutes: i32) -> NaiveDate {
    // Out-of-range offsets fall back to UTC
    let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    instant.with_timezone(&offset).date_naive()
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock moved by hand. Used by tests and the simulator.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock at noon UTC of the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self::new(Utc.from_utc_datetime(&noon))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_date_respects_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        assert_eq!(local_date(instant, 0), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        // UTC+8 is already the next day
        assert_eq!(local_date(instant, 8 * 60), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::at_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        clock.advance_days(1);
        assert_eq!(local_date(clock.now(), 0), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
