use reqwest::multipart::Form;
use serde::de::IgnoredAny;

use tesis_core::deliverable::validate_upload;
use tesis_core::proposal::{
    validate_new_proposal, validate_review, validate_tutor_vote, NewProposal, Proposal,
    ReviewDecision, TutorVote,
};
use tesis_core::types::DbId;

use crate::api::{json_part, ApiClient, UploadFile};
use crate::error::ClientResult;

use super::{or_empty, or_none};

#[derive(Debug, Clone)]
pub struct ProposalService {
    api: ApiClient,
}

impl ProposalService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Vec<Proposal> {
        or_empty(self.api.get("/propuestas").await, "propuestas")
    }

    pub async fn get(&self, id: DbId) -> Option<Proposal> {
        or_none(self.api.get(&format!("/propuestas/{id}")).await, "propuesta")
    }

    /// Proposals of the logged-in student.
    pub async fn mine(&self) -> Vec<Proposal> {
        or_empty(
            self.api.get("/propuestas/mis-propuestas").await,
            "propuestas/mis-propuestas",
        )
    }

    /// Submit a proposal with its PDF.
    pub async fn create(&self, form: &NewProposal, file: UploadFile) -> ClientResult<Proposal> {
        validate_new_proposal(form)?;
        validate_upload(&file.file_name, file.size())?;

        let multipart = Form::new()
            .part("propuesta", json_part(form)?)
            .part("archivo", file.into_part()?);
        let created: Proposal = self.api.post_multipart("/propuestas", multipart).await?;
        tracing::info!(propuesta_id = created.id, "Proposal submitted");
        Ok(created)
    }

    pub async fn update(&self, id: DbId, form: &NewProposal) -> ClientResult<Proposal> {
        validate_new_proposal(form)?;
        self.api.put(&format!("/propuestas/{id}"), form).await
    }

    /// Director review (`PATCH /propuestas/{id}/revision`).
    pub async fn review(&self, id: DbId, decision: &ReviewDecision) -> ClientResult<Proposal> {
        validate_review(decision)?;
        let updated: Proposal = self
            .api
            .patch(&format!("/propuestas/{id}/revision"), decision)
            .await?;
        tracing::info!(propuesta_id = id, estado = updated.estado.as_str(), "Proposal reviewed");
        Ok(updated)
    }

    /// Tutor interest vote; a tutor votes once per proposal.
    pub async fn vote(&self, proposal: &Proposal, vote: &TutorVote) -> ClientResult<()> {
        validate_tutor_vote(vote, &proposal.votos_tutores)?;
        let _: IgnoredAny = self
            .api
            .post(&format!("/propuestas/{}/votos", proposal.id), vote)
            .await?;
        Ok(())
    }
}
