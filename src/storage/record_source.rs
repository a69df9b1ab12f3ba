use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    clock::DateInterval,
    models::records::{DueExpenseRecord, IncomeRecord},
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Record storage is unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Read-only queries over the budget's financial records.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    async fn incomes(&self, interval: &DateInterval) -> Result<Vec<IncomeRecord>, FetchError>;

    async fn due_expenses(
        &self,
        interval: &DateInterval,
        ordered_by_date_ascending: bool,
    ) -> Result<Vec<DueExpenseRecord>, FetchError>;
}

#[derive(Default)]
pub struct InMemoryRecordSource {
    incomes: RwLock<Vec<IncomeRecord>>,
    due_expenses: RwLock<Vec<DueExpenseRecord>>,
}

impl InMemoryRecordSource {
    pub fn new(incomes: Vec<IncomeRecord>, due_expenses: Vec<DueExpenseRecord>) -> Self {
        Self {
            incomes: RwLock::new(incomes),
            due_expenses: RwLock::new(due_expenses),
        }
    }

    pub async fn insert_income(&self, income: IncomeRecord) {
        self.incomes.write().await.push(income);
    }

    pub async fn insert_due_expense(&self, expense: DueExpenseRecord) {
        self.due_expenses.write().await.push(expense);
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn incomes(&self, interval: &DateInterval) -> Result<Vec<IncomeRecord>, FetchError> {
        let incomes = self.incomes.read().await;

        Ok(incomes
            .iter()
            .filter(|income| interval.contains(income.due_date))
            .cloned()
            .collect())
    }

    async fn due_expenses(
        &self,
        interval: &DateInterval,
        ordered_by_date_ascending: bool,
    ) -> Result<Vec<DueExpenseRecord>, FetchError> {
        let mut expenses: Vec<_> = self
            .due_expenses
            .read()
            .await
            .iter()
            .filter(|expense| expense.due_date.is_some_and(|due| interval.contains(due)))
            .cloned()
            .collect();

        if ordered_by_date_ascending {
            expenses.sort_by_key(|expense| expense.due_date);
        }

        Ok(expenses)
    }
}
