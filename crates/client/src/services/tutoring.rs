use tesis_core::error::CoreError;
use tesis_core::tutoring::{ensure_single_active, AssignTutorRequest, TutoringAssignment};
use tesis_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::or_empty;

#[derive(Debug, Clone)]
pub struct TutoringService {
    api: ApiClient,
}

impl TutoringService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Vec<TutoringAssignment> {
        or_empty(
            self.api.get("/trabajos-titulacion").await,
            "trabajos-titulacion",
        )
    }

    /// The active assignment of a proposal, or a conflict if the backend
    /// reports more than one.
    pub async fn active_for(&self, propuesta_id: DbId) -> ClientResult<Option<TutoringAssignment>> {
        let assignments = self.list().await;
        Ok(ensure_single_active(&assignments, propuesta_id)?.cloned())
    }

    pub async fn assign(&self, request: AssignTutorRequest) -> ClientResult<TutoringAssignment> {
        if request.propuesta_id <= 0 || request.tutor_id <= 0 {
            return Err(CoreError::Validation("Seleccione una propuesta y un tutor".to_string()).into());
        }
        let created: TutoringAssignment = self.api.post("/trabajos-titulacion", &request).await?;
        tracing::info!(
            propuesta_id = request.propuesta_id,
            tutor_id = request.tutor_id,
            "Tutor assigned",
        );
        Ok(created)
    }
}
