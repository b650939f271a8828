use tesis_core::bitacora::{
    ensure_editable, validate_meeting, validate_meeting_review, MeetingDraft, MeetingLog,
    MeetingReview,
};
use tesis_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::or_empty;

#[derive(Debug, Clone)]
pub struct BitacoraService {
    api: ApiClient,
}

impl BitacoraService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, trabajo_id: DbId) -> Vec<MeetingLog> {
        or_empty(
            self.api
                .get(&format!("/bitacora/trabajo/{trabajo_id}"))
                .await,
            "bitacora",
        )
    }

    pub async fn create(&self, draft: &MeetingDraft) -> ClientResult<MeetingLog> {
        validate_meeting(draft)?;
        self.api.post("/bitacora", draft).await
    }

    pub async fn update(&self, log: &MeetingLog, draft: &MeetingDraft) -> ClientResult<MeetingLog> {
        ensure_editable(log)?;
        validate_meeting(draft)?;
        self.api.put(&format!("/bitacora/{}", log.id), draft).await
    }

    /// Close the entry for tutor review. It cannot be edited afterwards.
    pub async fn finalize(&self, log: &MeetingLog) -> ClientResult<MeetingLog> {
        ensure_editable(log)?;
        let updated: MeetingLog = self
            .api
            .patch_empty(&format!("/bitacora/{}/finalizar", log.id))
            .await?;
        tracing::info!(bitacora_id = log.id, semana = log.semana, "Meeting log finalized");
        Ok(updated)
    }

    pub async fn review(&self, log: &MeetingLog, review: &MeetingReview) -> ClientResult<MeetingLog> {
        validate_meeting_review(log, review)?;
        self.api
            .patch(&format!("/bitacora/{}/revision", log.id), review)
            .await
    }
}
