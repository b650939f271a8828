//! Tutoring meeting log ("bitácora", `/bitacora`).
//!
//! One entry per weekly meeting between tutor and student. The student
//! drafts it, finalizes it, and the tutor approves or rejects it. Public
//! defense paperwork requires [`REQUIRED_APPROVED_WEEKS`] approved weeks.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reconcile::Identified;
use crate::types::{hour_minute, DbId};

pub const REQUIRED_APPROVED_WEEKS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Presencial,
    Virtual,
}

/// Tutor review state. Unknown values read as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingState {
    Aprobada,
    Rechazada,
    #[default]
    #[serde(other)]
    Pendiente,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    pub descripcion: String,
    #[serde(default)]
    pub cumplido: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingLog {
    pub id: DbId,
    pub trabajo_id: DbId,
    pub semana: u32,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub hora_inicio: Option<String>,
    #[serde(default)]
    pub hora_fin: Option<String>,
    #[serde(default)]
    pub modalidad: Option<Modality>,
    #[serde(default)]
    pub temas: String,
    #[serde(default)]
    pub compromisos: Vec<Commitment>,
    #[serde(default)]
    pub asistencia: bool,
    #[serde(default)]
    pub finalizada: bool,
    #[serde(default)]
    pub estado: MeetingState,
    #[serde(default)]
    pub observaciones: Option<String>,
}

impl Identified for MeetingLog {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Body of `POST /bitacora` and `PUT /bitacora/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDraft {
    pub trabajo_id: DbId,
    pub semana: u32,
    pub fecha: NaiveDate,
    #[serde(with = "hour_minute")]
    pub hora_inicio: NaiveTime,
    #[serde(with = "hour_minute")]
    pub hora_fin: NaiveTime,
    pub modalidad: Modality,
    pub temas: String,
    pub compromisos: Vec<Commitment>,
    pub asistencia: bool,
}

pub fn validate_meeting(draft: &MeetingDraft) -> Result<(), CoreError> {
    if draft.semana == 0 {
        return Err(CoreError::Validation(
            "La semana debe ser mayor que cero".to_string(),
        ));
    }
    if draft.hora_fin <= draft.hora_inicio {
        return Err(CoreError::Validation(
            "La hora de fin debe ser posterior a la hora de inicio".to_string(),
        ));
    }
    if draft.temas.trim().is_empty() {
        return Err(CoreError::Validation(
            "Los temas tratados son obligatorios".to_string(),
        ));
    }
    if draft.compromisos.iter().any(|c| c.descripcion.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Los compromisos no pueden estar vacíos".to_string(),
        ));
    }
    Ok(())
}

/// Finalized logs are read-only for the student.
pub fn ensure_editable(log: &MeetingLog) -> Result<(), CoreError> {
    if log.finalizada {
        return Err(CoreError::Conflict(format!(
            "La bitácora de la semana {} ya fue finalizada",
            log.semana
        )));
    }
    Ok(())
}

/// Body of `PATCH /bitacora/{id}/revision`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingReview {
    pub estado: MeetingState,
    pub observaciones: Option<String>,
}

/// Only finalized logs can be reviewed, and a rejection needs a reason.
pub fn validate_meeting_review(log: &MeetingLog, review: &MeetingReview) -> Result<(), CoreError> {
    if !log.finalizada {
        return Err(CoreError::Precondition(
            "La bitácora debe estar finalizada antes de revisarla".to_string(),
        ));
    }
    match review.estado {
        MeetingState::Pendiente => Err(CoreError::Validation(
            "Debe aprobar o rechazar la bitácora".to_string(),
        )),
        MeetingState::Aprobada => Ok(()),
        MeetingState::Rechazada => {
            if review
                .observaciones
                .as_deref()
                .is_some_and(|o| !o.trim().is_empty())
            {
                Ok(())
            } else {
                Err(CoreError::Validation(
                    "Indique las observaciones del rechazo".to_string(),
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub approved_weeks: usize,
    pub required_weeks: usize,
    /// 0..=100
    pub percentage: u8,
    pub unlocked: bool,
}

pub fn weekly_progress(logs: &[MeetingLog]) -> WeeklyProgress {
    let weeks: BTreeSet<u32> = logs
        .iter()
        .filter(|l| l.estado == MeetingState::Aprobada)
        .map(|l| l.semana)
        .collect();
    let approved_weeks = weeks.len();
    let percentage = (approved_weeks * 100 / REQUIRED_APPROVED_WEEKS).min(100) as u8;
    WeeklyProgress {
        approved_weeks,
        required_weeks: REQUIRED_APPROVED_WEEKS,
        percentage,
        unlocked: approved_weeks >= REQUIRED_APPROVED_WEEKS,
    }
}
