use std::sync::{Mutex, PoisonError};

use chrono::{
    DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::models::reminder::ReminderTime;

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar every day-boundary computation of a refresh goes through.
    fn calendar(&self) -> Calendar;
}

pub struct SystemClock {
    calendar: Calendar,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self {
            calendar: Calendar::new(timezone),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn calendar(&self) -> Calendar {
        self.calendar
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    calendar: Calendar,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            now: Mutex::new(now),
            calendar: Calendar::new(timezone),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn calendar(&self) -> Calendar {
        self.calendar
    }
}

/// Half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Day arithmetic in a single timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    timezone: Tz,
}

impl Calendar {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    pub fn day_start(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of(self.date_of(instant))
    }

    pub fn start_of(&self, day: NaiveDate) -> DateTime<Utc> {
        self.resolve_local(day.and_time(NaiveTime::MIN))
    }

    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_of(a) == self.date_of(b)
    }

    pub fn add_days(&self, day: NaiveDate, days: u32) -> Option<NaiveDate> {
        day.checked_add_days(Days::new(u64::from(days)))
    }

    pub fn set_time_of_day(&self, day: NaiveDate, time: ReminderTime) -> DateTime<Utc> {
        self.resolve_local(day.and_time(*time.time()))
    }

    /// `days` whole calendar days starting with the day `now` falls on.
    pub fn lookahead(&self, now: DateTime<Utc>, days: u32) -> Option<DateInterval> {
        let today = self.date_of(now);
        let end = self.add_days(today, days)?;

        Some(DateInterval {
            start: self.start_of(today),
            end: self.start_of(end),
        })
    }

    /// Wall-clock times skipped by a DST jump move forward by an hour, repeated ones
    /// take the earlier instant.
    fn resolve_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let resolved = match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(instant) => instant,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => local
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| self.timezone.from_local_datetime(&shifted).earliest())
                .unwrap_or_else(|| self.timezone.from_utc_datetime(&local)),
        };

        resolved.with_timezone(&Utc)
    }
}
