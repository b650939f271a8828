use serde::de::IgnoredAny;

use tesis_core::proposal::{validate_review, Proposal, ReviewDecision};
use tesis_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::or_empty;

#[derive(Debug, Clone)]
pub struct CommitteeService {
    api: ApiClient,
}

impl CommitteeService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Proposals waiting for the committee.
    pub async fn pending(&self) -> Vec<Proposal> {
        or_empty(self.api.get("/comite/propuestas").await, "comite/propuestas")
    }

    pub async fn review(&self, id: DbId, decision: &ReviewDecision) -> ClientResult<()> {
        validate_review(decision)?;
        let _: IgnoredAny = self
            .api
            .post(&format!("/comite/propuestas/{id}/revision"), decision)
            .await?;
        tracing::info!(propuesta_id = id, estado = decision.estado.as_str(), "Committee review sent");
        Ok(())
    }
}
