use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::reminder::ScheduledTrigger;

use super::{DispatchError, NotificationDispatcher, PendingTrigger};

/// Keeps pending triggers in a map. Submissions are dropped while unauthorized.
pub struct InMemoryDispatcher {
    authorized: AtomicBool,
    pending: RwLock<HashMap<String, ScheduledTrigger>>,
}

impl InMemoryDispatcher {
    pub fn new(authorized: bool) -> Self {
        Self {
            authorized: AtomicBool::new(authorized),
            pending: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::Relaxed);
    }

    /// Pending triggers ordered by fire time, then identifier.
    pub async fn pending(&self) -> Vec<ScheduledTrigger> {
        let mut pending: Vec<_> = self.pending.read().await.values().cloned().collect();
        pending.sort_by(|a, b| (a.fire_at, &a.id).cmp(&(b.fire_at, &b.id)));
        pending
    }
}

impl Default for InMemoryDispatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryDispatcher {
    async fn request_authorization(&self) -> bool {
        self.authorized.load(Ordering::Relaxed)
    }

    async fn pending_triggers(&self) -> Result<Vec<PendingTrigger>, DispatchError> {
        Ok(self
            .pending
            .read()
            .await
            .keys()
            .map(|identifier| PendingTrigger {
                identifier: identifier.clone(),
            })
            .collect())
    }

    async fn cancel(&self, identifiers: &HashSet<String>) -> Result<(), DispatchError> {
        let mut pending = self.pending.write().await;
        pending.retain(|identifier, _| !identifiers.contains(identifier));
        Ok(())
    }

    async fn submit(&self, trigger: ScheduledTrigger) -> Result<(), DispatchError> {
        if !self.authorized.load(Ordering::Relaxed) {
            log::debug!("Not authorized, dropping {}", trigger.id);
            return Ok(());
        }

        self.pending
            .write()
            .await
            .insert(trigger.identifier(), trigger);
        Ok(())
    }
}
