use serde::de::IgnoredAny;

use tesis_core::notification::{sort_newest_first, Notification, UnreadCountResponse};
use tesis_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::{or_empty, or_none};

#[derive(Debug, Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<Notification> {
        let mut list = or_empty(self.api.get("/notificaciones").await, "notificaciones");
        sort_newest_first(&mut list);
        list
    }

    /// `None` when the count could not be fetched.
    pub async fn unread_count(&self) -> Option<u64> {
        or_none(
            self.api
                .get::<UnreadCountResponse>("/notificaciones/no-leidas/count")
                .await,
            "notificaciones/no-leidas/count",
        )
        .map(UnreadCountResponse::count)
    }

    pub async fn mark_read(&self, id: DbId) -> ClientResult<()> {
        let _: IgnoredAny = self
            .api
            .patch_empty(&format!("/notificaciones/{id}/leida"))
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> ClientResult<()> {
        let _: IgnoredAny = self.api.patch_empty("/notificaciones/leidas").await?;
        Ok(())
    }

    pub async fn delete(&self, id: DbId) -> ClientResult<()> {
        self.api.delete(&format!("/notificaciones/{id}")).await
    }
}
