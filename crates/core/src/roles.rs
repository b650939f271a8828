//! Well-known role names and per-role capabilities.
//!
//! The wire strings must match the backend's `Rol` enumeration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "ESTUDIANTE";
pub const ROLE_TUTOR: &str = "TUTOR";
pub const ROLE_DIRECTOR: &str = "DIRECTOR";
pub const ROLE_COORDINATOR: &str = "COORDINADOR";
pub const ROLE_COMMITTEE: &str = "COMITE";
pub const ROLE_INTEGRATION_TEACHER: &str = "DOCENTE_INTEGRACION";
pub const ROLE_ADMIN: &str = "ADMIN";

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &[
    ROLE_STUDENT,
    ROLE_TUTOR,
    ROLE_DIRECTOR,
    ROLE_COORDINATOR,
    ROLE_COMMITTEE,
    ROLE_INTEGRATION_TEACHER,
    ROLE_ADMIN,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Estudiante,
    Tutor,
    Director,
    Coordinador,
    Comite,
    DocenteIntegracion,
    Admin,
}

/// Actions gated by role on the boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SubmitProposal,
    ReviewProposal,
    VoteProposal,
    AssignTutor,
    VerifyPrerequisites,
    ScheduleDefense,
    GradeDefense,
    UploadDeliverable,
    ManageMeetingLog,
    ManageUsers,
}

impl Role {
    pub fn from_wire(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_STUDENT => Ok(Self::Estudiante),
            ROLE_TUTOR => Ok(Self::Tutor),
            ROLE_DIRECTOR => Ok(Self::Director),
            ROLE_COORDINATOR => Ok(Self::Coordinador),
            ROLE_COMMITTEE => Ok(Self::Comite),
            ROLE_INTEGRATION_TEACHER => Ok(Self::DocenteIntegracion),
            ROLE_ADMIN => Ok(Self::Admin),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Estudiante => ROLE_STUDENT,
            Self::Tutor => ROLE_TUTOR,
            Self::Director => ROLE_DIRECTOR,
            Self::Coordinador => ROLE_COORDINATOR,
            Self::Comite => ROLE_COMMITTEE,
            Self::DocenteIntegracion => ROLE_INTEGRATION_TEACHER,
            Self::Admin => ROLE_ADMIN,
        }
    }

    /// Landing dashboard route after login.
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Estudiante => "/estudiante/dashboard",
            Self::Tutor => "/tutor/dashboard",
            Self::Director => "/director/dashboard",
            Self::Coordinador => "/coordinador/dashboard",
            Self::Comite => "/comite/dashboard",
            Self::DocenteIntegracion => "/docente-integracion/dashboard",
            Self::Admin => "/admin/usuarios",
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Self::Admin => true,
            Self::Estudiante => matches!(
                capability,
                SubmitProposal | UploadDeliverable | ManageMeetingLog
            ),
            Self::Tutor => matches!(capability, VoteProposal | ManageMeetingLog | GradeDefense),
            Self::Director => matches!(
                capability,
                ReviewProposal | AssignTutor | ScheduleDefense | GradeDefense
            ),
            Self::Coordinador => matches!(
                capability,
                AssignTutor | VerifyPrerequisites | ScheduleDefense
            ),
            Self::Comite => matches!(capability, ReviewProposal | GradeDefense),
            Self::DocenteIntegracion => matches!(capability, VerifyPrerequisites),
        }
    }

    /// Fail with `Forbidden` when the role lacks `capability`.
    pub fn require(self, capability: Capability) -> Result<(), CoreError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "El rol {} no puede realizar {capability:?}",
                self.as_str()
            )))
        }
    }
}
