use std::sync::Arc;

use tesis_core::notification::{unread_count, Notification};
use tesis_core::reconcile::ReconciledList;
use tesis_core::types::DbId;

use crate::error::ClientResult;
use crate::ports::NotificationPort;

/// Notification dropdown: list, unread badge and read/delete actions.
pub struct NotificationCenter {
    port: Arc<dyn NotificationPort>,
    list: ReconciledList<Notification>,
}

impl NotificationCenter {
    pub fn new(port: Arc<dyn NotificationPort>) -> Self {
        Self {
            port,
            list: ReconciledList::default(),
        }
    }

    pub async fn load(&mut self) {
        self.list.replace_all(self.port.notifications().await);
    }

    pub fn items(&self) -> &[Notification] {
        self.list.items()
    }

    pub fn unread(&self) -> usize {
        unread_count(self.list.items())
    }

    pub async fn mark_read(&mut self, id: DbId) -> ClientResult<()> {
        self.list.patch(id, |n| n.leida = true);
        let result = self.port.mark_read(id).await;
        self.reconcile_on_error(&result, "mark_read").await;
        result
    }

    pub async fn mark_all_read(&mut self) -> ClientResult<()> {
        let ids: Vec<DbId> = self.list.items().iter().map(|n| n.id).collect();
        for id in ids {
            self.list.patch(id, |n| n.leida = true);
        }
        let result = self.port.mark_all_read().await;
        self.reconcile_on_error(&result, "mark_all_read").await;
        result
    }

    pub async fn delete(&mut self, id: DbId) -> ClientResult<()> {
        self.list.remove(id);
        let result = self.port.delete(id).await;
        self.reconcile_on_error(&result, "delete").await;
        result
    }

    async fn reconcile_on_error(&mut self, result: &ClientResult<()>, action: &'static str) {
        if let Err(e) = result {
            tracing::warn!(action, error = %e, "Notification action failed, reloading");
            self.load().await;
        }
    }
}
