//! Tutor assignments (`/trabajos-titulacion`).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::proposal::Proposal;
use crate::reconcile::Identified;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutoringAssignment {
    pub id: DbId,
    pub propuesta_id: DbId,
    pub tutor_id: DbId,
    #[serde(default)]
    pub activo: bool,
    #[serde(default)]
    pub fecha_asignacion: Option<Timestamp>,
}

impl Identified for TutoringAssignment {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Body of `POST /trabajos-titulacion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTutorRequest {
    pub propuesta_id: DbId,
    pub tutor_id: DbId,
}

/// The active assignment for `propuesta_id`, if any. More than one active
/// assignment is a data conflict.
pub fn ensure_single_active(
    assignments: &[TutoringAssignment],
    propuesta_id: DbId,
) -> Result<Option<&TutoringAssignment>, CoreError> {
    let mut active = assignments
        .iter()
        .filter(|a| a.propuesta_id == propuesta_id && a.activo);
    let first = active.next();
    if active.next().is_some() {
        return Err(CoreError::Conflict(format!(
            "La propuesta {propuesta_id} tiene más de un tutor activo"
        )));
    }
    Ok(first)
}

/// A tutor can only be assigned to an existing, approved proposal that
/// has no tutor yet.
pub fn ensure_assignable(proposal: Option<&Proposal>, propuesta_id: DbId) -> Result<(), CoreError> {
    let Some(proposal) = proposal else {
        return Err(CoreError::NotFound {
            entity: "Propuesta",
            id: propuesta_id,
        });
    };
    if proposal.tutor.is_some() {
        return Err(CoreError::Precondition(
            "La propuesta ya tiene un tutor asignado".to_string(),
        ));
    }
    if !proposal.estado.is_approved() {
        return Err(CoreError::Precondition(format!(
            "Solo se puede asignar tutor a propuestas aprobadas (estado actual: {})",
            proposal.estado.as_str()
        )));
    }
    Ok(())
}
