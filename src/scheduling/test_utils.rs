use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::UTC;
use uuid::Uuid;

use crate::{
    clock::{DateInterval, ManualClock},
    delivery::{DispatchError, InMemoryDispatcher, NotificationDispatcher, PendingTrigger},
    models::{
        records::{DueExpenseRecord, IncomeRecord},
        reminder::{ReminderKind, ScheduledTrigger, TriggerId},
        settings::ReminderSettings,
    },
    storage::{FetchError, InMemoryRecordSource, InMemorySettingsStore, RecordSource},
};

use super::LocalReminderScheduler;

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

pub fn income(id: u128, due_date: DateTime<Utc>, is_planned: bool) -> IncomeRecord {
    IncomeRecord {
        id: Uuid::from_u128(id),
        due_date,
        is_planned,
    }
}

pub fn preset(id: u128, due_date: DateTime<Utc>) -> DueExpenseRecord {
    DueExpenseRecord {
        id: Some(Uuid::from_u128(id)),
        due_date: Some(due_date),
        is_global_template: true,
        actual_amount_recorded: false,
        description: Some("Rent".to_owned()),
    }
}

pub fn trigger(kind: ReminderKind, key: &str, fire_at: DateTime<Utc>) -> ScheduledTrigger {
    ScheduledTrigger {
        id: TriggerId::new(kind, key),
        fire_at,
        title: "title".to_owned(),
        body: "body".to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchCall {
    Pending,
    Cancel(Vec<String>),
    Submit(String),
}

type PendingHook = Box<dyn Fn() + Send + Sync>;

/// In-memory dispatcher that records every call and can be told to fail.
pub struct RecordingDispatcher {
    pub inner: InMemoryDispatcher,
    calls: Mutex<Vec<DispatchCall>>,
    fail_pending: AtomicBool,
    failing_submits: Mutex<HashSet<String>>,
    pending_delay: Option<Duration>,
    on_pending: Option<PendingHook>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDispatcher::new(true),
            calls: Mutex::new(Vec::new()),
            fail_pending: AtomicBool::new(false),
            failing_submits: Mutex::new(HashSet::new()),
            pending_delay: None,
            on_pending: None,
        }
    }

    pub fn with_pending_delay(mut self, delay: Duration) -> Self {
        self.pending_delay = Some(delay);
        self
    }

    pub fn with_pending_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_pending = Some(Box::new(hook));
        self
    }

    pub fn fail_pending(&self, fail: bool) {
        self.fail_pending.store(fail, Ordering::Relaxed);
    }

    pub fn fail_submit(&self, identifier: &str) {
        self.failing_submits
            .lock()
            .unwrap()
            .insert(identifier.to_owned());
    }

    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub async fn pending_ids(&self) -> Vec<String> {
        self.inner
            .pending()
            .await
            .iter()
            .map(ScheduledTrigger::identifier)
            .collect()
    }

    pub async fn pending_of(&self, kind: ReminderKind) -> Vec<ScheduledTrigger> {
        self.inner
            .pending()
            .await
            .into_iter()
            .filter(|trigger| trigger.kind() == kind)
            .collect()
    }

    fn record(&self, call: DispatchCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn request_authorization(&self) -> bool {
        self.inner.request_authorization().await
    }

    async fn pending_triggers(&self) -> Result<Vec<PendingTrigger>, DispatchError> {
        self.record(DispatchCall::Pending);
        if let Some(delay) = self.pending_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = &self.on_pending {
            hook();
        }
        if self.fail_pending.load(Ordering::Relaxed) {
            return Err(DispatchError::Unavailable("pending list".to_owned()));
        }
        self.inner.pending_triggers().await
    }

    async fn cancel(&self, identifiers: &HashSet<String>) -> Result<(), DispatchError> {
        let mut sorted: Vec<_> = identifiers.iter().cloned().collect();
        sorted.sort();
        self.record(DispatchCall::Cancel(sorted));
        self.inner.cancel(identifiers).await
    }

    async fn submit(&self, trigger: ScheduledTrigger) -> Result<(), DispatchError> {
        let identifier = trigger.identifier();
        self.record(DispatchCall::Submit(identifier.clone()));
        if self.failing_submits.lock().unwrap().contains(&identifier) {
            return Err(DispatchError::Rejected {
                identifier,
                reason: "test failure".to_owned(),
            });
        }
        self.inner.submit(trigger).await
    }
}

pub struct FailingRecordSource;

#[async_trait]
impl RecordSource for FailingRecordSource {
    async fn incomes(&self, _interval: &DateInterval) -> Result<Vec<IncomeRecord>, FetchError> {
        Err(FetchError::Unavailable("incomes".to_owned()))
    }

    async fn due_expenses(
        &self,
        _interval: &DateInterval,
        _ordered_by_date_ascending: bool,
    ) -> Result<Vec<DueExpenseRecord>, FetchError> {
        Err(FetchError::Unavailable("due expenses".to_owned()))
    }
}

pub struct TestContext {
    pub clock: Arc<ManualClock>,
    pub settings: Arc<InMemorySettingsStore>,
    pub records: Arc<InMemoryRecordSource>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub scheduler: LocalReminderScheduler,
}

impl TestContext {
    pub fn new(now: DateTime<Utc>, settings: ReminderSettings) -> Self {
        Self::with_dispatcher(now, settings, RecordingDispatcher::default())
    }

    pub fn with_dispatcher(
        now: DateTime<Utc>,
        settings: ReminderSettings,
        dispatcher: RecordingDispatcher,
    ) -> Self {
        let records = Arc::new(InMemoryRecordSource::default());
        Self::build(
            Arc::new(ManualClock::new(now, UTC)),
            settings,
            records.clone(),
            records,
            dispatcher,
        )
    }

    pub fn with_source(
        now: DateTime<Utc>,
        settings: ReminderSettings,
        source: Arc<dyn RecordSource>,
    ) -> Self {
        Self::build(
            Arc::new(ManualClock::new(now, UTC)),
            settings,
            Arc::new(InMemoryRecordSource::default()),
            source,
            RecordingDispatcher::new(),
        )
    }

    pub fn build(
        clock: Arc<ManualClock>,
        settings: ReminderSettings,
        records: Arc<InMemoryRecordSource>,
        source: Arc<dyn RecordSource>,
        dispatcher: RecordingDispatcher,
    ) -> Self {
        let settings = Arc::new(InMemorySettingsStore::from_settings(&settings));
        let dispatcher = Arc::new(dispatcher);
        let scheduler = LocalReminderScheduler::new(
            clock.clone(),
            settings.clone(),
            source,
            dispatcher.clone(),
        );

        Self {
            clock,
            settings,
            records,
            dispatcher,
            scheduler,
        }
    }
}

pub fn all_enabled() -> ReminderSettings {
    ReminderSettings {
        enable_daily: true,
        enable_planned_income: true,
        enable_preset_due: true,
        ..ReminderSettings::default()
    }
}
