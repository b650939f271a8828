//! User and teacher records as returned by `/usuarios`, `/auth` and `/docentes`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub nombres: String,
    #[serde(default)]
    pub apellidos: String,
    pub correo: String,
    pub rol: Role,
    #[serde(default)]
    pub perfil: Option<Profile>,
}

/// Academic profile of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub escuela: Option<String>,
    #[serde(default)]
    pub sede: Option<String>,
    #[serde(default)]
    pub malla: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        join_name(&self.nombres, &self.apellidos)
    }
}

/// A teacher eligible as tutor or tribunal member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docente {
    pub id: DbId,
    pub nombres: String,
    #[serde(default)]
    pub apellidos: String,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
}

impl Docente {
    /// Display name prefixed with the academic title when present,
    /// e.g. `Dra. Maria Elena Silva`.
    pub fn display_name(&self) -> String {
        let name = join_name(&self.nombres, &self.apellidos);
        match self.titulo.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => format!("{t} {name}"),
            _ => name,
        }
    }
}

/// Payload for `POST /usuarios`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub nombres: String,
    pub apellidos: String,
    pub correo: String,
    pub rol: Role,
    pub password: String,
}

/// Institutional mail domain accepted for new accounts.
pub const INSTITUTIONAL_DOMAIN: &str = "@uide.edu.ec";

pub fn validate_new_user(user: &NewUser) -> Result<(), CoreError> {
    if user.nombres.trim().is_empty()
        || user.apellidos.trim().is_empty()
        || user.correo.trim().is_empty()
        || user.password.is_empty()
    {
        return Err(CoreError::Validation(
            "Todos los campos son obligatorios".to_string(),
        ));
    }
    if !user.correo.trim().to_lowercase().ends_with(INSTITUTIONAL_DOMAIN) {
        return Err(CoreError::Validation(format!(
            "El correo debe ser institucional ({INSTITUTIONAL_DOMAIN})"
        )));
    }
    Ok(())
}

fn join_name(first: &str, last: &str) -> String {
    let first = first.trim();
    let last = last.trim();
    if last.is_empty() {
        first.to_string()
    } else {
        format!("{first} {last}")
    }
}
