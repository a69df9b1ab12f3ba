use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use chrono::{DateTime, Utc};

use crate::models::settings::{ReminderSettings, SettingsKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

/// Key-value user settings. Lookups of missing or mistyped keys return `None`.
pub trait SettingsStore: Send + Sync + 'static {
    fn get(&self, key: SettingsKey) -> Option<SettingValue>;
    fn set(&self, key: SettingsKey, value: SettingValue);

    fn bool(&self, key: SettingsKey) -> Option<bool> {
        match self.get(key)? {
            SettingValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    fn int(&self, key: SettingsKey) -> Option<i64> {
        match self.get(key)? {
            SettingValue::Int(value) => Some(value),
            _ => None,
        }
    }

    fn timestamp(&self, key: SettingsKey) -> Option<DateTime<Utc>> {
        match self.get(key)? {
            SettingValue::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    fn set_timestamp(&self, key: SettingsKey, value: DateTime<Utc>) {
        self.set(key, SettingValue::Timestamp(value));
    }

    /// Current settings with defaults filled in for absent keys.
    fn snapshot(&self) -> ReminderSettings {
        let defaults = ReminderSettings::default();
        let flag = |key, default| self.bool(key).unwrap_or(default);

        ReminderSettings {
            enable_daily: flag(SettingsKey::EnableDaily, defaults.enable_daily),
            enable_planned_income: flag(
                SettingsKey::EnablePlannedIncome,
                defaults.enable_planned_income,
            ),
            enable_preset_due: flag(SettingsKey::EnablePresetDue, defaults.enable_preset_due),
            exclude_non_global_presets: flag(
                SettingsKey::ExcludeNonGlobalPresets,
                defaults.exclude_non_global_presets,
            ),
            silence_preset_if_actual_recorded: flag(
                SettingsKey::SilencePresetIfActualRecorded,
                defaults.silence_preset_if_actual_recorded,
            ),
            reminder_minutes_of_day: self
                .int(SettingsKey::ReminderMinutesOfDay)
                .unwrap_or(defaults.reminder_minutes_of_day),
            last_app_open: self.timestamp(SettingsKey::LastAppOpen),
            last_record_added: self.timestamp(SettingsKey::LastRecordAdded),
        }
    }
}

#[derive(Default)]
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<SettingsKey, SettingValue>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with every value of `settings`.
    pub fn from_settings(settings: &ReminderSettings) -> Self {
        let store = Self::new();
        store.apply(settings);
        store
    }

    pub fn apply(&self, settings: &ReminderSettings) {
        let flags = [
            (SettingsKey::EnableDaily, settings.enable_daily),
            (SettingsKey::EnablePlannedIncome, settings.enable_planned_income),
            (SettingsKey::EnablePresetDue, settings.enable_preset_due),
            (
                SettingsKey::ExcludeNonGlobalPresets,
                settings.exclude_non_global_presets,
            ),
            (
                SettingsKey::SilencePresetIfActualRecorded,
                settings.silence_preset_if_actual_recorded,
            ),
        ];
        for (key, value) in flags {
            self.set(key, SettingValue::Bool(value));
        }

        self.set(
            SettingsKey::ReminderMinutesOfDay,
            SettingValue::Int(settings.reminder_minutes_of_day),
        );

        for (key, value) in [
            (SettingsKey::LastAppOpen, settings.last_app_open),
            (SettingsKey::LastRecordAdded, settings.last_record_added),
        ] {
            match value {
                Some(timestamp) => self.set_timestamp(key, timestamp),
                None => self.remove(key),
            }
        }
    }

    pub fn remove(&self, key: SettingsKey) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self, key: SettingsKey) -> Option<SettingValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
    }

    fn set(&self, key: SettingsKey, value: SettingValue) {
        log::debug!("Setting {} = {:?}", key.as_str(), value);
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }
}
