//! Thesis proposals (`/propuestas`): review states, badges and form validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reconcile::Identified;
use crate::search::matches_query;
use crate::types::DbId;
use crate::user::Docente;

// ---------------------------------------------------------------------------
// Review state
// ---------------------------------------------------------------------------

pub const STATE_PENDING: &str = "PENDIENTE";
pub const STATE_APPROVED: &str = "APROBADA";
pub const STATE_APPROVED_WITH_COMMENTS: &str = "APROBADA_CON_COMENTARIOS";
pub const STATE_REJECTED: &str = "RECHAZADA";

/// Review state of a proposal. Unrecognised wire values are kept verbatim
/// in `Unknown` so that labels can fall back to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewState {
    Pendiente,
    Aprobada,
    AprobadaConComentarios,
    Rechazada,
    Unknown(String),
}

impl From<&str> for ReviewState {
    fn from(s: &str) -> Self {
        match s {
            STATE_PENDING => Self::Pendiente,
            STATE_APPROVED => Self::Aprobada,
            STATE_APPROVED_WITH_COMMENTS => Self::AprobadaConComentarios,
            STATE_REJECTED => Self::Rechazada,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ReviewState {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ReviewState> for String {
    fn from(state: ReviewState) -> Self {
        state.as_str().to_string()
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::Pendiente
    }
}

impl ReviewState {
    pub fn from_wire(raw: &str) -> Self {
        Self::from(raw)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pendiente => STATE_PENDING,
            Self::Aprobada => STATE_APPROVED,
            Self::AprobadaConComentarios => STATE_APPROVED_WITH_COMMENTS,
            Self::Rechazada => STATE_REJECTED,
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Aprobada | Self::AprobadaConComentarios)
    }
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

/// Colour family of a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Error,
    Info,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: String,
    pub tone: Tone,
}

/// Badge for a review state.
pub fn state_badge(state: &ReviewState) -> StatusBadge {
    let (label, tone) = match state {
        ReviewState::Pendiente => ("Pendiente", Tone::Warning),
        ReviewState::Aprobada => ("Aprobado", Tone::Success),
        ReviewState::AprobadaConComentarios => ("Aprobado con Comentarios", Tone::Warning),
        ReviewState::Rechazada => ("Rechazado", Tone::Error),
        ReviewState::Unknown(raw) => {
            return StatusBadge {
                label: raw.clone(),
                tone: Tone::Neutral,
            }
        }
    };
    StatusBadge {
        label: label.to_string(),
        tone,
    }
}

/// Badge for a raw backend string. Total: unknown input is its own label.
pub fn status_badge(raw: &str) -> StatusBadge {
    state_badge(&ReviewState::from_wire(raw))
}

pub fn status_label(raw: &str) -> String {
    status_badge(raw).label
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Owning student as embedded in a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: DbId,
    pub nombres: String,
    #[serde(default)]
    pub apellidos: String,
    #[serde(default)]
    pub correo: Option<String>,
}

/// One tutor's interest in supervising a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorVote {
    pub tutor_id: DbId,
    pub prioridad: u8,
    pub justificacion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: DbId,
    pub titulo: String,
    #[serde(default)]
    pub objetivo_general: String,
    #[serde(default)]
    pub objetivos_especificos: Vec<String>,
    #[serde(default)]
    pub problematica: String,
    #[serde(default)]
    pub alcance: String,
    #[serde(default)]
    pub archivo_url: Option<String>,
    #[serde(default)]
    pub area_conocimiento: Option<String>,
    #[serde(default)]
    pub estudiante: Option<StudentSummary>,
    #[serde(default)]
    pub estado: ReviewState,
    #[serde(default)]
    pub comentario_revision: Option<String>,
    #[serde(default)]
    pub tutor: Option<Docente>,
    #[serde(default)]
    pub votos_tutores: Vec<TutorVote>,
}

pub const TUTOR_ASSIGNED_LABEL: &str = "Tutor Asignado";
pub const TUTOR_MISSING_LABEL: &str = "Sin Tutor";

impl Proposal {
    pub fn badge(&self) -> StatusBadge {
        state_badge(&self.estado)
    }

    /// Tutoring column label on the assignment board.
    pub fn tutoring_label(&self) -> &'static str {
        if self.tutor.is_some() {
            TUTOR_ASSIGNED_LABEL
        } else {
            TUTOR_MISSING_LABEL
        }
    }

    pub fn tutor_name(&self) -> Option<String> {
        self.tutor.as_ref().map(Docente::display_name)
    }

    pub fn student_name(&self) -> String {
        self.estudiante
            .as_ref()
            .map(|s| format!("{} {}", s.nombres, s.apellidos).trim().to_string())
            .unwrap_or_default()
    }

    /// Free-text match over title, student and area.
    pub fn matches(&self, query: &str) -> bool {
        let student = self.student_name();
        matches_query(
            &[
                self.titulo.as_str(),
                student.as_str(),
                self.area_conocimiento.as_deref().unwrap_or_default(),
            ],
            query,
        )
    }
}

impl Identified for Proposal {
    fn id(&self) -> DbId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Fields of the proposal submission form (sent alongside the PDF).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    pub titulo: String,
    pub objetivo_general: String,
    pub objetivos_especificos: Vec<String>,
    pub problematica: String,
    pub alcance: String,
    pub area_conocimiento: String,
}

pub fn validate_new_proposal(form: &NewProposal) -> Result<(), CoreError> {
    let required = [
        &form.titulo,
        &form.objetivo_general,
        &form.problematica,
        &form.alcance,
        &form.area_conocimiento,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Todos los campos son obligatorios".to_string(),
        ));
    }
    if form.objetivos_especificos.iter().any(|o| o.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Los objetivos específicos no pueden estar vacíos".to_string(),
        ));
    }
    Ok(())
}

/// Reviewer decision for `PATCH /propuestas/{id}/revision`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub estado: ReviewState,
    pub comentario: Option<String>,
}

/// A decision must be final, and anything short of a clean approval needs
/// a comment for the student.
pub fn validate_review(decision: &ReviewDecision) -> Result<(), CoreError> {
    match &decision.estado {
        ReviewState::Pendiente | ReviewState::Unknown(_) => Err(CoreError::Validation(format!(
            "Estado de revisión inválido '{}'",
            decision.estado.as_str()
        ))),
        ReviewState::Aprobada => Ok(()),
        ReviewState::AprobadaConComentarios | ReviewState::Rechazada => {
            let has_comment = decision
                .comentario
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty());
            if has_comment {
                Ok(())
            } else {
                Err(CoreError::Validation(
                    "Debe incluir un comentario para el estudiante".to_string(),
                ))
            }
        }
    }
}

pub const MIN_VOTE_PRIORITY: u8 = 1;
pub const MAX_VOTE_PRIORITY: u8 = 3;

pub fn validate_tutor_vote(vote: &TutorVote, existing: &[TutorVote]) -> Result<(), CoreError> {
    if !(MIN_VOTE_PRIORITY..=MAX_VOTE_PRIORITY).contains(&vote.prioridad) {
        return Err(CoreError::Validation(format!(
            "La prioridad debe estar entre {MIN_VOTE_PRIORITY} y {MAX_VOTE_PRIORITY}"
        )));
    }
    if vote.justificacion.trim().is_empty() {
        return Err(CoreError::Validation(
            "La justificación es obligatoria".to_string(),
        ));
    }
    if existing.iter().any(|v| v.tutor_id == vote.tutor_id) {
        return Err(CoreError::Conflict(
            "Ya registró un voto para esta propuesta".to_string(),
        ));
    }
    Ok(())
}
