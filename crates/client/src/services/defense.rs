use serde::Serialize;

use tesis_core::defense::{
    build_grade_sheet, DefenseKind, DefenseRecord, ParticipantAssignment, Schedule, Tribunal,
    TRIBUNAL_SIZE,
};
use tesis_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::{or_empty, or_none};

#[derive(Debug, Serialize)]
struct ParticipantsRequest {
    participantes: [ParticipantAssignment; TRIBUNAL_SIZE],
}

#[derive(Debug, Clone)]
pub struct DefenseService {
    api: ApiClient,
}

impl DefenseService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn base(kind: DefenseKind) -> String {
        format!("/defensas/{}", kind.path_segment())
    }

    pub async fn list(&self, kind: DefenseKind) -> Vec<DefenseRecord> {
        or_empty(self.api.get(&Self::base(kind)).await, "defensas")
    }

    pub async fn get(&self, kind: DefenseKind, id: DbId) -> Option<DefenseRecord> {
        or_none(
            self.api.get(&format!("{}/{id}", Self::base(kind))).await,
            "defensa",
        )
    }

    /// Set date, time and room. The schedule is already validated.
    pub async fn schedule(
        &self,
        kind: DefenseKind,
        id: DbId,
        schedule: &Schedule,
    ) -> ClientResult<DefenseRecord> {
        let record: DefenseRecord = self
            .api
            .put(&format!("{}/{id}/programar", Self::base(kind)), schedule)
            .await?;
        tracing::info!(defensa_id = id, kind = kind.path_segment(), "Defense scheduled");
        Ok(record)
    }

    pub async fn assign_participants(
        &self,
        kind: DefenseKind,
        id: DbId,
        tribunal: &Tribunal,
    ) -> ClientResult<DefenseRecord> {
        let body = ParticipantsRequest {
            participantes: tribunal.participants(),
        };
        let record: DefenseRecord = self
            .api
            .put(&format!("{}/{id}/participantes", Self::base(kind)), &body)
            .await?;
        tracing::info!(defensa_id = id, kind = kind.path_segment(), "Tribunal assigned");
        Ok(record)
    }

    /// Submit the tribunal's grades; the outcome follows from the mean.
    pub async fn grade(
        &self,
        record: &DefenseRecord,
        grades: &[(DbId, f64)],
    ) -> ClientResult<DefenseRecord> {
        let sheet = build_grade_sheet(record, grades)?;
        let updated: DefenseRecord = self
            .api
            .put(
                &format!("{}/{}/calificacion", Self::base(record.tipo), record.id),
                &sheet,
            )
            .await?;
        tracing::info!(
            defensa_id = record.id,
            calificacion = sheet.calificacion_final.rounded(),
            estado = sheet.estado.as_str(),
            "Defense graded",
        );
        Ok(updated)
    }
}
