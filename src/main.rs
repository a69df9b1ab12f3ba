use std::sync::Arc;

use budget_reminders::{
    appsettings::AppSettings,
    clock::SystemClock,
    delivery::InMemoryDispatcher,
    scheduling::LocalReminderScheduler,
    storage::{InMemoryRecordSource, InMemorySettingsStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load()?;
    let timezone = settings.timezone;
    log::info!("Refreshing reminders in {timezone}");

    let settings_store = Arc::new(InMemorySettingsStore::from_settings(&settings.reminders));
    let records = Arc::new(InMemoryRecordSource::new(
        settings.incomes,
        settings.due_expenses,
    ));
    let dispatcher = Arc::new(InMemoryDispatcher::new(true));

    let scheduler = LocalReminderScheduler::new(
        Arc::new(SystemClock::new(timezone)),
        settings_store,
        records,
        dispatcher.clone(),
    )
    .with_policy(settings.lookahead);

    if std::env::args().any(|arg| arg == "--opened") {
        scheduler.record_app_open();
    }

    let summary = scheduler.refresh_all().await;
    for (kind, result) in summary.results() {
        match result {
            Ok(report) => log::info!(
                "{kind}: {} pending, {} failed",
                report.submitted,
                report.failed
            ),
            Err(e) => log::error!("{kind}: {e:#}"),
        }
    }

    for trigger in dispatcher.pending().await {
        println!(
            "{}  {:<60}  {}",
            trigger.fire_at.with_timezone(&timezone).format("%Y-%m-%d %H:%M %Z"),
            trigger.id,
            trigger.title
        );
    }

    Ok(())
}
