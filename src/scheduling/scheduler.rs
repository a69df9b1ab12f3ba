use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    clock::{Calendar, Clock, DateInterval},
    delivery::{DispatchError, NotificationDispatcher},
    models::{
        reminder::{ReminderKind, ScheduledTrigger},
        settings::{ReminderSettings, SettingsKey},
    },
    storage::{RecordSource, SettingsStore},
};

use super::planner::{self, LookaheadPolicy};

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Failed to list pending {kind} triggers")]
    PendingTriggers {
        kind: ReminderKind,
        #[source]
        source: DispatchError,
    },

    #[error("Failed to cancel stale {kind} triggers")]
    Cancel {
        kind: ReminderKind,
        #[source]
        source: DispatchError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub kind: ReminderKind,
    pub cancelled: usize,
    pub submitted: usize,
    pub failed: usize,
    /// Planned triggers whose fire time had passed by the time they were due for submission.
    pub skipped_past: usize,
}

impl RefreshReport {
    fn new(kind: ReminderKind) -> Self {
        Self {
            kind,
            cancelled: 0,
            submitted: 0,
            failed: 0,
            skipped_past: 0,
        }
    }
}

#[derive(Debug)]
pub struct RefreshSummary {
    pub authorized: bool,
    pub daily: Result<RefreshReport, SchedulingError>,
    pub planned_income: Result<RefreshReport, SchedulingError>,
    pub preset_due: Result<RefreshReport, SchedulingError>,
}

impl RefreshSummary {
    pub fn results(&self) -> [(ReminderKind, &Result<RefreshReport, SchedulingError>); 3] {
        [
            (ReminderKind::Daily, &self.daily),
            (ReminderKind::PlannedIncome, &self.planned_income),
            (ReminderKind::PresetExpenseDue, &self.preset_due),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.results()
            .iter()
            .all(|(_, result)| matches!(result, Ok(report) if report.failed == 0))
    }
}

struct KindLocks {
    daily: Mutex<()>,
    planned_income: Mutex<()>,
    preset_due: Mutex<()>,
}

impl KindLocks {
    fn new() -> Self {
        Self {
            daily: Mutex::new(()),
            planned_income: Mutex::new(()),
            preset_due: Mutex::new(()),
        }
    }

    fn get(&self, kind: ReminderKind) -> &Mutex<()> {
        match kind {
            ReminderKind::Daily => &self.daily,
            ReminderKind::PlannedIncome => &self.planned_income,
            ReminderKind::PresetExpenseDue => &self.preset_due,
        }
    }
}

/// Keeps the dispatcher's pending reminders in line with settings and records.
///
/// Holds no state between refreshes apart from the per-kind locks that stop two
/// reconciliations of the same namespace from interleaving.
pub struct LocalReminderScheduler {
    clock: Arc<dyn Clock>,
    settings: Arc<dyn SettingsStore>,
    records: Arc<dyn RecordSource>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    policy: LookaheadPolicy,
    locks: KindLocks,
}

impl LocalReminderScheduler {
    pub fn new(
        clock: Arc<dyn Clock>,
        settings: Arc<dyn SettingsStore>,
        records: Arc<dyn RecordSource>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            clock,
            settings,
            records,
            dispatcher,
            policy: LookaheadPolicy::default(),
            locks: KindLocks::new(),
        }
    }

    pub fn with_policy(mut self, policy: LookaheadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn request_authorization(&self) -> bool {
        let authorized = self.dispatcher.request_authorization().await;
        if !authorized {
            log::info!("Notifications are not authorized, pending reminders will stay silent");
        }
        authorized
    }

    pub fn record_app_open(&self) {
        self.settings
            .set_timestamp(SettingsKey::LastAppOpen, self.clock.now());
    }

    pub fn record_expense_added(&self) {
        self.settings
            .set_timestamp(SettingsKey::LastRecordAdded, self.clock.now());
    }

    pub async fn refresh_all(&self) -> RefreshSummary {
        let authorized = self.request_authorization().await;

        let (daily, planned_income, preset_due) = tokio::join!(
            self.refresh_daily(),
            self.refresh_planned_income(),
            self.refresh_preset_due(),
        );

        let summary = RefreshSummary {
            authorized,
            daily,
            planned_income,
            preset_due,
        };

        for (kind, result) in summary.results() {
            if let Err(e) = result {
                log::error!("Refreshing {kind} reminders failed: {e}");
            }
        }

        summary
    }

    pub async fn refresh_daily(&self) -> Result<RefreshReport, SchedulingError> {
        self.refresh(ReminderKind::Daily).await
    }

    pub async fn refresh_planned_income(&self) -> Result<RefreshReport, SchedulingError> {
        self.refresh(ReminderKind::PlannedIncome).await
    }

    pub async fn refresh_preset_due(&self) -> Result<RefreshReport, SchedulingError> {
        self.refresh(ReminderKind::PresetExpenseDue).await
    }

    pub async fn refresh(&self, kind: ReminderKind) -> Result<RefreshReport, SchedulingError> {
        let _guard = self.locks.get(kind).lock().await;

        let now = self.clock.now();
        let calendar = self.clock.calendar();
        let settings = self.settings.snapshot();

        let targets = self.plan(kind, &calendar, now, &settings).await;
        log::debug!("[{kind}] Planned {} triggers", targets.len());

        self.reconcile(kind, targets).await
    }

    async fn plan(
        &self,
        kind: ReminderKind,
        calendar: &Calendar,
        now: DateTime<Utc>,
        settings: &ReminderSettings,
    ) -> Vec<ScheduledTrigger> {
        if !settings.is_enabled(kind) {
            log::debug!("[{kind}] Disabled, clearing namespace");
            return Vec::new();
        }

        let days = self.policy.days(kind);
        match kind {
            ReminderKind::Daily => planner::plan_daily(calendar, now, settings, days),
            ReminderKind::PlannedIncome => {
                let Some(window) = lookahead(kind, calendar, now, days) else {
                    return Vec::new();
                };
                let incomes = self.records.incomes(&window).await.unwrap_or_else(|e| {
                    log::warn!("[{kind}] Could not fetch incomes, treating as empty: {e}");
                    Vec::new()
                });
                planner::plan_planned_income(calendar, now, settings, &window, &incomes)
            }
            ReminderKind::PresetExpenseDue => {
                let Some(window) = lookahead(kind, calendar, now, days) else {
                    return Vec::new();
                };
                let expenses = self
                    .records
                    .due_expenses(&window, true)
                    .await
                    .unwrap_or_else(|e| {
                        log::warn!("[{kind}] Could not fetch due expenses, treating as empty: {e}");
                        Vec::new()
                    });
                planner::plan_preset_due(calendar, now, settings, &window, &expenses)
            }
        }
    }

    /// Cancels everything pending in the namespace, then submits `targets`.
    async fn reconcile(
        &self,
        kind: ReminderKind,
        targets: Vec<ScheduledTrigger>,
    ) -> Result<RefreshReport, SchedulingError> {
        let stale: HashSet<String> = self
            .dispatcher
            .pending_triggers()
            .await
            .map_err(|source| SchedulingError::PendingTriggers { kind, source })?
            .into_iter()
            .map(|pending| pending.identifier)
            .filter(|identifier| kind.owns(identifier))
            .collect();

        let mut report = RefreshReport::new(kind);

        if !stale.is_empty() {
            self.dispatcher
                .cancel(&stale)
                .await
                .map_err(|source| SchedulingError::Cancel { kind, source })?;
            report.cancelled = stale.len();
        }

        for trigger in targets {
            if trigger.fire_at <= self.clock.now() {
                report.skipped_past += 1;
                continue;
            }

            let id = trigger.id.clone();
            match self.dispatcher.submit(trigger).await {
                Ok(()) => report.submitted += 1,
                Err(e) => {
                    log::warn!("[RECONCILE] Submitting {id} failed: {e}");
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "[RECONCILE] {kind}: cancelled {}, submitted {}, failed {}, skipped {}",
            report.cancelled,
            report.submitted,
            report.failed,
            report.skipped_past
        );

        Ok(report)
    }
}

fn lookahead(
    kind: ReminderKind,
    calendar: &Calendar,
    now: DateTime<Utc>,
    days: u32,
) -> Option<DateInterval> {
    let window = calendar.lookahead(now, days);
    if window.is_none() {
        log::warn!("[{kind}] Lookahead of {days} days is out of calendar range");
    }
    window
}
