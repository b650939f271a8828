//! One service per backend resource.
//!
//! Reads return plain data and log failures instead of propagating them;
//! mutations validate locally first and return [`ClientResult`].

pub mod auth;
pub mod bitacora;
pub mod committee;
pub mod defense;
pub mod docente;
pub mod entregable;
pub mod notification;
pub mod prerequisite;
pub mod proposal;
pub mod tutoring;
pub mod usuario;

pub use auth::AuthService;
pub use bitacora::BitacoraService;
pub use committee::CommitteeService;
pub use defense::DefenseService;
pub use docente::DocenteService;
pub use entregable::{EntregableService, UploadedVersion};
pub use notification::NotificationService;
pub use prerequisite::PrerequisiteService;
pub use proposal::ProposalService;
pub use tutoring::TutoringService;
pub use usuario::UsuarioService;

use crate::api::ApiClient;
use crate::error::ClientResult;

/// All services built over one [`ApiClient`].
#[derive(Debug, Clone)]
pub struct Backend {
    pub auth: AuthService,
    pub bitacora: BitacoraService,
    pub committee: CommitteeService,
    pub defenses: DefenseService,
    pub docentes: DocenteService,
    pub entregables: EntregableService,
    pub notifications: NotificationService,
    pub prerequisites: PrerequisiteService,
    pub proposals: ProposalService,
    pub tutoring: TutoringService,
    pub usuarios: UsuarioService,
}

impl Backend {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            bitacora: BitacoraService::new(api.clone()),
            committee: CommitteeService::new(api.clone()),
            defenses: DefenseService::new(api.clone()),
            docentes: DocenteService::new(api.clone()),
            entregables: EntregableService::new(api.clone()),
            notifications: NotificationService::new(api.clone()),
            prerequisites: PrerequisiteService::new(api.clone()),
            proposals: ProposalService::new(api.clone()),
            tutoring: TutoringService::new(api.clone()),
            usuarios: UsuarioService::new(api),
        }
    }
}

/// Swallow a failed list read: log it and show nothing.
pub(crate) fn or_empty<T>(result: ClientResult<Vec<T>>, what: &'static str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(resource = what, error = %e, "Failed to load list");
        Vec::new()
    })
}

/// Swallow a failed single-item read.
pub(crate) fn or_none<T>(result: ClientResult<T>, what: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(resource = what, error = %e, "Failed to load item");
            None
        }
    }
}
