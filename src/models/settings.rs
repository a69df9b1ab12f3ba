use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::reminder::{DEFAULT_REMINDER_MINUTES, ReminderKind, ReminderTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    EnableDaily,
    EnablePlannedIncome,
    EnablePresetDue,
    ExcludeNonGlobalPresets,
    SilencePresetIfActualRecorded,
    ReminderMinutesOfDay,
    LastAppOpen,
    LastRecordAdded,
}

impl SettingsKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingsKey::EnableDaily => "enable_daily",
            SettingsKey::EnablePlannedIncome => "enable_planned_income",
            SettingsKey::EnablePresetDue => "enable_preset_due",
            SettingsKey::ExcludeNonGlobalPresets => "exclude_non_global_presets",
            SettingsKey::SilencePresetIfActualRecorded => "silence_preset_if_actual_recorded",
            SettingsKey::ReminderMinutesOfDay => "reminder_minutes_of_day",
            SettingsKey::LastAppOpen => "last_app_open",
            SettingsKey::LastRecordAdded => "last_record_added",
        }
    }
}

/// Read-only view of everything a refresh needs from user settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    pub enable_daily: bool,
    pub enable_planned_income: bool,
    pub enable_preset_due: bool,
    pub exclude_non_global_presets: bool,
    pub silence_preset_if_actual_recorded: bool,
    /// Stored as-is; see [`ReminderSettings::reminder_time`] for the clamped value.
    pub reminder_minutes_of_day: i64,
    pub last_app_open: Option<DateTime<Utc>>,
    pub last_record_added: Option<DateTime<Utc>>,
}

impl ReminderSettings {
    pub fn reminder_time(&self) -> ReminderTime {
        ReminderTime::from_minutes(self.reminder_minutes_of_day)
    }

    pub fn is_enabled(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::Daily => self.enable_daily,
            ReminderKind::PlannedIncome => self.enable_planned_income,
            ReminderKind::PresetExpenseDue => self.enable_preset_due,
        }
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enable_daily: false,
            enable_planned_income: false,
            enable_preset_due: false,
            exclude_non_global_presets: false,
            silence_preset_if_actual_recorded: false,
            reminder_minutes_of_day: DEFAULT_REMINDER_MINUTES,
            last_app_open: None,
            last_record_added: None,
        }
    }
}
