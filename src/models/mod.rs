pub mod records;
pub mod reminder;
pub mod settings;
