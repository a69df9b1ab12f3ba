use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    models::{
        records::{DueExpenseRecord, IncomeRecord},
        settings::ReminderSettings,
    },
    scheduling::LookaheadPolicy,
};

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub timezone: Tz,
    #[serde(default)]
    pub reminders: ReminderSettings,
    #[serde(default)]
    pub lookahead: LookaheadPolicy,
    #[serde(default)]
    pub incomes: Vec<IncomeRecord>,
    #[serde(default)]
    pub due_expenses: Vec<DueExpenseRecord>,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(true))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
