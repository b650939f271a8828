//! Private and public thesis defenses (`/defensas/{privada|publica}`).
//!
//! Covers the UI status derivation (including the public-defense lock),
//! the defense state machine, tribunal/schedule validation, grading and
//! the document-readiness gate in front of the assignment dialog.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::deliverable::DocumentSet;
use crate::error::CoreError;
use crate::reconcile::Identified;
use crate::types::{hour_minute, DbId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum grade that passes a defense (inclusive).
pub const PASSING_GRADE: f64 = 7.0;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 10.0;

/// Number of tribunal members.
pub const TRIBUNAL_SIZE: usize = 3;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Todos los campos son obligatorios";

pub const DUPLICATE_TRIBUNAL_MEMBER: &str =
    "Un mismo docente no puede ocupar más de un rol en el tribunal";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseKind {
    Privada,
    Publica,
}

impl DefenseKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Privada => "privada",
            Self::Publica => "publica",
        }
    }
}

/// Backend defense state. Anything unrecognised parses as `Desconocido`
/// and is shown as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseState {
    #[default]
    Pendiente,
    Programada,
    Realizada,
    Aprobada,
    Rechazada,
    #[serde(other)]
    Desconocido,
}

impl DefenseState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Programada => "PROGRAMADA",
            Self::Realizada => "REALIZADA",
            Self::Aprobada => "APROBADA",
            Self::Rechazada => "RECHAZADA",
            Self::Desconocido => "DESCONOCIDO",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Aprobada | Self::Rechazada)
    }
}

/// Status shown on defense cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseUiStatus {
    Pending,
    Assigned,
    Approved,
    Failed,
    Locked,
}

impl DefenseUiStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Approved => "approved",
            Self::Failed => "failed",
            Self::Locked => "locked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TribunalRole {
    #[serde(rename = "PRESIDENTE")]
    Presidente,
    #[serde(rename = "JURADO_1")]
    Jurado1,
    #[serde(rename = "JURADO_2")]
    Jurado2,
}

impl TribunalRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Presidente => "Presidente",
            Self::Jurado1 => "Jurado 1",
            Self::Jurado2 => "Jurado 2",
        }
    }
}

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

/// A defense grade on the 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Grade(pub f64);

impl Grade {
    /// Coerce a JSON number or numeric string (`"7"`, `"7,5"`) into a grade.
    /// Anything else yields `None`.
    pub fn coerce(value: &serde_json::Value) -> Option<Self> {
        let n = match value {
            serde_json::Value::Number(n) => n.as_f64()?,
            serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(Self(n))
    }

    pub fn passes(self) -> bool {
        self.0 >= PASSING_GRADE
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Two-decimal value for display. Pass/fail decisions use the exact value.
    pub fn rounded(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Grade {
    let n = values.len() as f64;
    Grade(values.sum::<f64>() / n)
}

/// Field deserializer that never fails on malformed grades.
fn lenient_grade<'de, D>(deserializer: D) -> Result<Option<Grade>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Grade::coerce))
}

pub fn validate_grade(value: f64) -> Result<Grade, CoreError> {
    if !value.is_finite() || !(MIN_GRADE..=MAX_GRADE).contains(&value) {
        return Err(CoreError::Validation(format!(
            "La calificación debe estar entre {MIN_GRADE} y {MAX_GRADE}"
        )));
    }
    Ok(Grade(value))
}

pub fn outcome_for_grade(grade: Grade) -> DefenseState {
    if grade.passes() {
        DefenseState::Aprobada
    } else {
        DefenseState::Rechazada
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub docente_id: DbId,
    #[serde(default)]
    pub nombre: Option<String>,
    pub rol: TribunalRole,
    #[serde(default, deserialize_with = "lenient_grade")]
    pub calificacion: Option<Grade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseRecord {
    pub id: DbId,
    pub propuesta_id: DbId,
    pub tipo: DefenseKind,
    #[serde(default)]
    pub estado: DefenseState,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub estudiante: Option<String>,
    /// Kept as sent by the backend; only drafts are strictly typed.
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub hora: Option<String>,
    #[serde(default)]
    pub aula: Option<String>,
    #[serde(default)]
    pub participantes: Vec<Participant>,
    #[serde(default, deserialize_with = "lenient_grade")]
    pub calificacion: Option<Grade>,
}

impl DefenseRecord {
    pub fn ui_status(&self) -> DefenseUiStatus {
        private_status(self.estado)
    }

    /// Recorded aggregate grade, else the mean of the tribunal grades.
    pub fn effective_grade(&self) -> Option<Grade> {
        self.calificacion
            .or_else(|| aggregate_grade(&self.participantes))
    }

    pub fn member(&self, rol: TribunalRole) -> Option<&Participant> {
        self.participantes.iter().find(|p| p.rol == rol)
    }
}

impl Identified for DefenseRecord {
    fn id(&self) -> DbId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Status derivation
// ---------------------------------------------------------------------------

pub fn private_status(state: DefenseState) -> DefenseUiStatus {
    match state {
        DefenseState::Aprobada => DefenseUiStatus::Approved,
        DefenseState::Rechazada => DefenseUiStatus::Failed,
        DefenseState::Programada => DefenseUiStatus::Assigned,
        DefenseState::Pendiente | DefenseState::Realizada | DefenseState::Desconocido => {
            DefenseUiStatus::Pending
        }
    }
}

/// The public defense opens once the private one is approved or graded
/// at least [`PASSING_GRADE`]. Either condition suffices.
pub fn public_unlocked(private_state: DefenseState, private_grade: Option<Grade>) -> bool {
    private_state == DefenseState::Aprobada || private_grade.is_some_and(Grade::passes)
}

pub fn public_status(
    public_state: DefenseState,
    private_state: DefenseState,
    private_grade: Option<Grade>,
) -> DefenseUiStatus {
    if public_unlocked(private_state, private_grade) {
        private_status(public_state)
    } else {
        DefenseUiStatus::Locked
    }
}

/// Public status when the private defense record may not exist yet.
pub fn public_status_for(
    public_state: DefenseState,
    private: Option<&DefenseRecord>,
) -> DefenseUiStatus {
    match private {
        Some(p) => public_status(public_state, p.estado, p.effective_grade()),
        None => DefenseUiStatus::Locked,
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::DefenseState::{self, *};
    use crate::error::CoreError;

    /// Target states reachable from `from`. Terminal and unknown states
    /// have none.
    pub fn valid_transitions(from: DefenseState) -> &'static [DefenseState] {
        match from {
            Pendiente => &[Programada],
            // Programada -> Pendiente un-schedules a defense.
            Programada => &[Pendiente, Realizada, Aprobada, Rechazada],
            Realizada => &[Aprobada, Rechazada],
            Aprobada | Rechazada | Desconocido => &[],
        }
    }

    pub fn can_transition(from: DefenseState, to: DefenseState) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: DefenseState, to: DefenseState) -> Result<(), CoreError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Invalid transition: {} -> {}",
                from.as_str(),
                to.as_str()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Assignment drafts
// ---------------------------------------------------------------------------

/// Tribunal selection as entered in the dialog; any field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TribunalDraft {
    pub presidente: Option<DbId>,
    pub jurado1: Option<DbId>,
    pub jurado2: Option<DbId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tribunal {
    pub presidente: DbId,
    pub jurado1: DbId,
    pub jurado2: DbId,
}

/// Wire shape of one tribunal seat for `PUT …/participantes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAssignment {
    pub docente_id: DbId,
    pub rol: TribunalRole,
}

impl Tribunal {
    pub fn participants(&self) -> [ParticipantAssignment; TRIBUNAL_SIZE] {
        [
            ParticipantAssignment {
                docente_id: self.presidente,
                rol: TribunalRole::Presidente,
            },
            ParticipantAssignment {
                docente_id: self.jurado1,
                rol: TribunalRole::Jurado1,
            },
            ParticipantAssignment {
                docente_id: self.jurado2,
                rol: TribunalRole::Jurado2,
            },
        ]
    }

    pub fn contains(&self, docente_id: DbId) -> bool {
        self.participants().iter().any(|p| p.docente_id == docente_id)
    }
}

pub fn validate_tribunal(draft: &TribunalDraft) -> Result<Tribunal, CoreError> {
    let (Some(presidente), Some(jurado1), Some(jurado2)) =
        (draft.presidente, draft.jurado1, draft.jurado2)
    else {
        return Err(CoreError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    };
    if presidente == jurado1 || presidente == jurado2 || jurado1 == jurado2 {
        return Err(CoreError::Validation(DUPLICATE_TRIBUNAL_MEMBER.to_string()));
    }
    Ok(Tribunal {
        presidente,
        jurado1,
        jurado2,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub fecha: Option<NaiveDate>,
    pub hora: Option<NaiveTime>,
    pub aula: String,
}

/// Validated slot, serialized for `PUT …/programar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub fecha: NaiveDate,
    #[serde(with = "hour_minute")]
    pub hora: NaiveTime,
    pub aula: String,
}

fn schedule_fields_present(draft: &ScheduleDraft) -> bool {
    draft.fecha.is_some() && draft.hora.is_some() && !draft.aula.trim().is_empty()
}

pub fn validate_schedule(draft: &ScheduleDraft, today: NaiveDate) -> Result<Schedule, CoreError> {
    let (Some(fecha), Some(hora)) = (draft.fecha, draft.hora) else {
        return Err(CoreError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    };
    if draft.aula.trim().is_empty() {
        return Err(CoreError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }
    if fecha < today {
        return Err(CoreError::Validation(
            "La fecha de la defensa no puede estar en el pasado".to_string(),
        ));
    }
    Ok(Schedule {
        fecha,
        hora,
        aula: draft.aula.trim().to_string(),
    })
}

/// Everything the assignment dialog collects for one defense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenseAssignmentDraft {
    pub defense_id: DbId,
    pub schedule: ScheduleDraft,
    pub tribunal: TribunalDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenseAssignment {
    pub defense_id: DbId,
    pub schedule: Schedule,
    pub tribunal: Tribunal,
}

/// Required fields first (schedule and tribunal together), then duplicate
/// members, then the date.
pub fn validate_assignment(
    draft: &DefenseAssignmentDraft,
    today: NaiveDate,
) -> Result<DefenseAssignment, CoreError> {
    let t = &draft.tribunal;
    let tribunal_complete = t.presidente.is_some() && t.jurado1.is_some() && t.jurado2.is_some();
    if !schedule_fields_present(&draft.schedule) || !tribunal_complete {
        return Err(CoreError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }
    let tribunal = validate_tribunal(&draft.tribunal)?;
    let schedule = validate_schedule(&draft.schedule, today)?;
    Ok(DefenseAssignment {
        defense_id: draft.defense_id,
        schedule,
        tribunal,
    })
}

// ---------------------------------------------------------------------------
// Readiness gate
// ---------------------------------------------------------------------------

/// Whether the assignment dialog may open. Already assigned or failed
/// defenses always open; otherwise all three documents must be active.
pub fn ensure_assignment_allowed(
    status: DefenseUiStatus,
    documents: &DocumentSet,
) -> Result<(), CoreError> {
    if matches!(status, DefenseUiStatus::Assigned | DefenseUiStatus::Failed) {
        return Ok(());
    }
    if documents.ready() {
        return Ok(());
    }
    let missing: Vec<&str> = documents.missing().iter().map(|t| t.label()).collect();
    Err(CoreError::Precondition(format!(
        "No se puede asignar la defensa: faltan documentos ({})",
        missing.join(", ")
    )))
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Mean of the tribunal grades, once all three members have graded.
pub fn aggregate_grade(participants: &[Participant]) -> Option<Grade> {
    if participants.len() != TRIBUNAL_SIZE {
        return None;
    }
    let grades: Option<Vec<f64>> = participants
        .iter()
        .map(|p| p.calificacion.map(Grade::value))
        .collect();
    Some(mean(grades?.into_iter()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantGrade {
    pub docente_id: DbId,
    pub calificacion: Grade,
}

/// Grades submitted for `PUT …/calificacion`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSheet {
    pub calificaciones: Vec<ParticipantGrade>,
    pub calificacion_final: Grade,
    pub estado: DefenseState,
}

/// Build a grade sheet: every tribunal member graded exactly once, and the
/// defense must currently be scheduled or held.
pub fn build_grade_sheet(
    record: &DefenseRecord,
    grades: &[(DbId, f64)],
) -> Result<GradeSheet, CoreError> {
    if !matches!(
        record.estado,
        DefenseState::Programada | DefenseState::Realizada
    ) {
        return Err(CoreError::Precondition(format!(
            "No se puede calificar una defensa en estado {}",
            record.estado.as_str()
        )));
    }
    if record.participantes.len() != TRIBUNAL_SIZE {
        return Err(CoreError::Precondition(
            "La defensa no tiene un tribunal completo".to_string(),
        ));
    }

    let mut calificaciones = Vec::with_capacity(TRIBUNAL_SIZE);
    for member in &record.participantes {
        let mut matching = grades.iter().filter(|(id, _)| *id == member.docente_id);
        let Some((_, value)) = matching.next() else {
            return Err(CoreError::Validation(format!(
                "Falta la calificación de {}",
                member.rol.label()
            )));
        };
        if matching.next().is_some() {
            return Err(CoreError::Validation(format!(
                "Calificación duplicada para {}",
                member.rol.label()
            )));
        }
        calificaciones.push(ParticipantGrade {
            docente_id: member.docente_id,
            calificacion: validate_grade(*value)?,
        });
    }
    if let Some((stranger, _)) = grades
        .iter()
        .find(|(id, _)| !record.participantes.iter().any(|p| p.docente_id == *id))
    {
        return Err(CoreError::Validation(format!(
            "El docente {stranger} no forma parte del tribunal"
        )));
    }

    let calificacion_final = mean(calificaciones.iter().map(|g| g.calificacion.0));
    let estado = outcome_for_grade(calificacion_final);
    state_machine::validate_transition(record.estado, estado)?;

    Ok(GradeSheet {
        calificaciones,
        calificacion_final,
        estado,
    })
}
