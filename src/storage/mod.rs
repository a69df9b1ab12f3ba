mod record_source;
mod settings_store;

pub use record_source::{FetchError, InMemoryRecordSource, RecordSource};
pub use settings_store::{InMemorySettingsStore, SettingValue, SettingsStore};
