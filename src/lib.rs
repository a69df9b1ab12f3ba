pub mod appsettings;
pub mod clock;
pub mod delivery;
pub mod models;
pub mod scheduling;
pub mod storage;

pub use chrono;
pub use chrono_tz;
