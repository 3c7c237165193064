//! Clock port.
//!
//! The installation-date precondition compares calendar dates, so the
//! services never read the wall clock directly.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use std::sync::RwLock;

/// Source of the current instant and calendar date.
pub trait Clock: Send + Sync {
    /// Current instant, used for `updated_at` and log timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date, time of day ignored.
    fn today(&self) -> NaiveDate;
}

/// Wall clock. `today` is the local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Clock frozen at `now` until moved.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Clock set to noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::hours(12))
    }

    /// Move the clock to noon UTC on `date`.
    pub fn set_date(&self, date: NaiveDate) {
        let instant = date.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::hours(12);
        match self.now.write() {
            Ok(mut guard) => *guard = instant,
            Err(poisoned) => *poisoned.into_inner() = instant,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_moves() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        clock.set_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }
}
