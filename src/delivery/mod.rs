mod in_memory;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::reminder::ScheduledTrigger;

pub use in_memory::InMemoryDispatcher;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Notification service is unavailable: {0}")]
    Unavailable(String),

    #[error("Notification service rejected {identifier}: {reason}")]
    Rejected { identifier: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingTrigger {
    pub identifier: String,
}

/// Platform service that owns pending notifications and eventually shows them.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync + 'static {
    /// Whether the user allows notifications. Denial is not an error.
    async fn request_authorization(&self) -> bool;

    async fn pending_triggers(&self) -> Result<Vec<PendingTrigger>, DispatchError>;

    async fn cancel(&self, identifiers: &HashSet<String>) -> Result<(), DispatchError>;

    /// Replaces any pending trigger with the same identifier.
    async fn submit(&self, trigger: ScheduledTrigger) -> Result<(), DispatchError>;
}
