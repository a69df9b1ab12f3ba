use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

const PRESET_FALLBACK_NAME: &str = "Preset Expense";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncomeRecord {
    pub id: Uuid,
    pub due_date: DateTime<Utc>,
    pub is_planned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DueExpenseRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_global_template: bool,
    #[serde(default)]
    pub actual_amount_recorded: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl DueExpenseRecord {
    /// Identifier component of this record's trigger.
    ///
    /// Records without an id get a name-based UUID derived from their fields, so the
    /// same record keeps the same key between refreshes.
    pub fn stable_key(&self) -> String {
        let id = self.id.unwrap_or_else(|| {
            let seed = format!(
                "{}|{}|{}",
                self.description.as_deref().unwrap_or_default(),
                self.due_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
                self.is_global_template,
            );
            Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
        });

        id.to_string()
    }

    pub fn display_name(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(PRESET_FALLBACK_NAME)
    }
}

/// Income presence for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayAggregate {
    pub has_planned_income: bool,
    pub has_actual_income: bool,
}

impl DayAggregate {
    pub fn record(&mut self, income: &IncomeRecord) {
        if income.is_planned {
            self.has_planned_income = true;
        } else {
            self.has_actual_income = true;
        }
    }

    pub fn awaits_actual_income(&self) -> bool {
        self.has_planned_income && !self.has_actual_income
    }
}
