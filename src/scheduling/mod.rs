pub mod planner;
mod scheduler;

#[cfg(test)]
mod test_utils;

pub use planner::{
    LOOKAHEAD_DAYS_DAILY, LOOKAHEAD_DAYS_INCOME, LOOKAHEAD_DAYS_PRESET, LookaheadPolicy,
};
pub use scheduler::{LocalReminderScheduler, RefreshReport, RefreshSummary, SchedulingError};
