//! Pure computation of the triggers each reminder kind wants pending.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    clock::{Calendar, DateInterval},
    models::{
        records::{DayAggregate, DueExpenseRecord, IncomeRecord},
        reminder::{ReminderKind, ScheduledTrigger, TriggerId},
        settings::ReminderSettings,
    },
};

pub const LOOKAHEAD_DAYS_DAILY: u32 = 30;
pub const LOOKAHEAD_DAYS_INCOME: u32 = 45;
pub const LOOKAHEAD_DAYS_PRESET: u32 = 45;

const DAILY_TITLE: &str = "Log Variable Expenses";
const DAILY_BODY: &str =
    "If you haven't added any variable expenses today, take a moment to log them now.";
const PLANNED_INCOME_TITLE: &str = "Log Actual Income";
const PLANNED_INCOME_BODY: &str =
    "You planned income for today. Log the actual amount to compare planned vs actual.";
const PRESET_DUE_BODY: &str =
    "This preset expense is due today. Log it to keep your budgets accurate.";

/// How many days ahead each kind looks for candidate triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookaheadPolicy {
    pub daily_days: u32,
    pub planned_income_days: u32,
    pub preset_due_days: u32,
}

impl LookaheadPolicy {
    pub fn days(&self, kind: ReminderKind) -> u32 {
        match kind {
            ReminderKind::Daily => self.daily_days,
            ReminderKind::PlannedIncome => self.planned_income_days,
            ReminderKind::PresetExpenseDue => self.preset_due_days,
        }
    }
}

impl Default for LookaheadPolicy {
    fn default() -> Self {
        Self {
            daily_days: LOOKAHEAD_DAYS_DAILY,
            planned_income_days: LOOKAHEAD_DAYS_INCOME,
            preset_due_days: LOOKAHEAD_DAYS_PRESET,
        }
    }
}

pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn plan_daily(
    calendar: &Calendar,
    now: DateTime<Utc>,
    settings: &ReminderSettings,
    days: u32,
) -> Vec<ScheduledTrigger> {
    if !settings.enable_daily {
        return Vec::new();
    }

    let today = calendar.date_of(now);
    let time = settings.reminder_time();
    // Either signal alone counts as having engaged today.
    let engaged_today = [settings.last_app_open, settings.last_record_added]
        .into_iter()
        .flatten()
        .any(|instant| calendar.same_day(instant, now));

    let mut triggers = Vec::new();
    for offset in 0..days {
        let Some(day) = calendar.add_days(today, offset) else {
            break;
        };
        let fire_at = calendar.set_time_of_day(day, time);
        if fire_at <= now {
            continue;
        }
        if offset == 0 && engaged_today {
            log::debug!("[DAILY] Already engaged today, skipping {}", day_key(day));
            continue;
        }

        triggers.push(ScheduledTrigger {
            id: TriggerId::new(ReminderKind::Daily, day_key(day)),
            fire_at,
            title: DAILY_TITLE.to_owned(),
            body: DAILY_BODY.to_owned(),
        });
    }

    triggers
}

/// Folds incomes into one aggregate per local calendar day.
pub fn group_incomes_by_day(
    calendar: &Calendar,
    incomes: &[IncomeRecord],
) -> BTreeMap<NaiveDate, DayAggregate> {
    incomes.iter().fold(BTreeMap::new(), |mut days, income| {
        days.entry(calendar.date_of(income.due_date))
            .or_default()
            .record(income);
        days
    })
}

pub fn plan_planned_income(
    calendar: &Calendar,
    now: DateTime<Utc>,
    settings: &ReminderSettings,
    window: &DateInterval,
    incomes: &[IncomeRecord],
) -> Vec<ScheduledTrigger> {
    if !settings.enable_planned_income {
        return Vec::new();
    }

    let time = settings.reminder_time();
    let in_window: Vec<_> = incomes
        .iter()
        .filter(|income| window.contains(income.due_date))
        .cloned()
        .collect();

    group_incomes_by_day(calendar, &in_window)
        .into_iter()
        .filter(|(_, aggregate)| aggregate.awaits_actual_income())
        .filter_map(|(day, _)| {
            let fire_at = calendar.set_time_of_day(day, time);
            (fire_at > now).then(|| ScheduledTrigger {
                id: TriggerId::new(ReminderKind::PlannedIncome, day_key(day)),
                fire_at,
                title: PLANNED_INCOME_TITLE.to_owned(),
                body: PLANNED_INCOME_BODY.to_owned(),
            })
        })
        .collect()
}

pub fn plan_preset_due(
    calendar: &Calendar,
    now: DateTime<Utc>,
    settings: &ReminderSettings,
    window: &DateInterval,
    expenses: &[DueExpenseRecord],
) -> Vec<ScheduledTrigger> {
    if !settings.enable_preset_due {
        return Vec::new();
    }

    let time = settings.reminder_time();
    let mut triggers = Vec::new();

    for expense in expenses {
        if settings.exclude_non_global_presets && !expense.is_global_template {
            continue;
        }
        if settings.silence_preset_if_actual_recorded && expense.actual_amount_recorded {
            continue;
        }
        let Some(due_date) = expense.due_date.filter(|due| window.contains(*due)) else {
            continue;
        };

        let day = calendar.date_of(due_date);
        let fire_at = calendar.set_time_of_day(day, time);
        if fire_at <= now {
            continue;
        }

        let key = format!("{}-{}", expense.stable_key(), day_key(day));
        triggers.push(ScheduledTrigger {
            id: TriggerId::new(ReminderKind::PresetExpenseDue, key),
            fire_at,
            title: format!("{} Due Today", expense.display_name()),
            body: PRESET_DUE_BODY.to_owned(),
        });
    }

    dedup_by_identifier(triggers)
}

/// Keeps the first trigger for every identifier, preserving order.
pub fn dedup_by_identifier(triggers: Vec<ScheduledTrigger>) -> Vec<ScheduledTrigger> {
    let mut seen = HashSet::new();
    triggers
        .into_iter()
        .filter(|trigger| seen.insert(trigger.id.clone()))
        .collect()
}
