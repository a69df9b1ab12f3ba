use std::fmt;

use chrono::{DateTime, NaiveTime, Timelike, Utc};

pub const MINUTES_PER_DAY: i64 = 24 * 60;
pub const DEFAULT_REMINDER_MINUTES: i64 = 20 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReminderKind {
    Daily,
    PlannedIncome,
    PresetExpenseDue,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 3] = [
        ReminderKind::Daily,
        ReminderKind::PlannedIncome,
        ReminderKind::PresetExpenseDue,
    ];

    /// Namespace tag every identifier of this kind starts with.
    pub fn prefix(self) -> &'static str {
        match self {
            ReminderKind::Daily => "Daily",
            ReminderKind::PlannedIncome => "PlannedIncome",
            ReminderKind::PresetExpenseDue => "PresetExpenseDue",
        }
    }

    /// Whether a raw dispatcher identifier lives in this kind's namespace.
    pub fn owns(self, identifier: &str) -> bool {
        identifier
            .strip_prefix(self.prefix())
            .is_some_and(|rest| rest.starts_with(TriggerId::SEPARATOR))
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Structured trigger identifier. Only turned into a string at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId {
    pub kind: ReminderKind,
    pub key: String,
}

impl TriggerId {
    pub const SEPARATOR: char = '-';

    pub fn new(kind: ReminderKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    pub fn parse(identifier: &str) -> Option<Self> {
        ReminderKind::ALL.into_iter().find_map(|kind| {
            identifier
                .strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_prefix(Self::SEPARATOR))
                .filter(|key| !key.is_empty())
                .map(|key| Self::new(kind, key))
        })
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind.prefix(), Self::SEPARATOR, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTrigger {
    pub id: TriggerId,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

impl ScheduledTrigger {
    pub fn kind(&self) -> ReminderKind {
        self.id.kind
    }

    pub fn identifier(&self) -> String {
        self.id.to_string()
    }
}

/// Time of day a reminder fires at, with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    /// Out of range values are clamped into `[00:00, 23:59]`.
    pub fn from_minutes(minutes: i64) -> Self {
        let clamped = minutes.clamp(0, MINUTES_PER_DAY - 1);
        let time = NaiveTime::from_hms_opt((clamped / 60) as u32, (clamped % 60) as u32, 0)
            .expect("Clamped minutes are always a valid time.");
        Self(time)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_REMINDER_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn identifiers_round_trip_through_strings() {
        let id = TriggerId::new(ReminderKind::PlannedIncome, "2026-01-10");

        assert_eq!(id.to_string(), "PlannedIncome-2026-01-10");
        assert_eq!(TriggerId::parse("PlannedIncome-2026-01-10"), Some(id));
    }

    #[test]
    fn foreign_identifiers_are_not_parsed() {
        assert_eq!(TriggerId::parse("Dailyish-2026-01-10"), None);
        assert_eq!(TriggerId::parse("Daily-"), None);
        assert_eq!(TriggerId::parse("budget-sync"), None);
    }

    #[test]
    fn namespaces_do_not_overlap() {
        let preset = "PresetExpenseDue-abc-2026-01-10";

        assert!(ReminderKind::PresetExpenseDue.owns(preset));
        assert!(!ReminderKind::PlannedIncome.owns(preset));
        assert!(!ReminderKind::Daily.owns("DailyDigest-2026-01-10"));
    }

    #[test]
    fn negative_minutes_clamp_to_midnight() {
        let time = ReminderTime::from_minutes(-10);
        assert_eq!((time.hour(), time.minute()), (0, 0));
    }

    #[test]
    fn overflowing_minutes_clamp_to_last_minute() {
        let time = ReminderTime::from_minutes(1500);
        assert_eq!((time.hour(), time.minute()), (23, 59));
    }

    #[test]
    fn default_reminder_time_is_eight_pm() {
        let time = ReminderTime::default();
        assert_eq!((time.hour(), time.minute()), (20, 0));
    }

    #[proptest]
    fn reminder_time_is_always_on_the_minute(minutes: i64) {
        let time = ReminderTime::from_minutes(minutes);
        let expected = minutes.clamp(0, MINUTES_PER_DAY - 1);

        assert_eq!(time.time().second(), 0);
        assert_eq!(i64::from(time.hour() * 60 + time.minute()), expected);
    }
}
