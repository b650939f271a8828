//! Final deliverables (`/entregables`) and their version history.
//!
//! Each proposal has up to three deliverable types. Every upload creates a
//! new version; exactly one version per type is active and older ones are
//! retained unchanged as history.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest file accepted by the upload endpoint (20 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Accepted file extensions for deliverables.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliverableType {
    Tesis,
    ManualUsuario,
    Articulo,
}

pub const ALL_TYPES: [DeliverableType; 3] = [
    DeliverableType::Tesis,
    DeliverableType::ManualUsuario,
    DeliverableType::Articulo,
];

impl DeliverableType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tesis => "TESIS",
            Self::ManualUsuario => "MANUAL_USUARIO",
            Self::Articulo => "ARTICULO",
        }
    }

    /// Key used by the document-readiness view.
    pub fn ui_key(self) -> &'static str {
        match self {
            Self::Tesis => "tesis",
            Self::ManualUsuario => "userManual",
            Self::Articulo => "scientificArticle",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tesis => "Tesis",
            Self::ManualUsuario => "Manual de usuario",
            Self::Articulo => "Artículo científico",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub id: DbId,
    pub propuesta_id: DbId,
    pub tipo: DeliverableType,
    pub version: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub archivo_url: Option<String>,
    #[serde(default)]
    pub nombre_archivo: String,
    #[serde(default)]
    pub fecha_subida: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliverableHistory {
    items: Vec<Deliverable>,
}

impl DeliverableHistory {
    pub fn new(items: Vec<Deliverable>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Deliverable] {
        &self.items
    }

    pub fn active(&self, tipo: DeliverableType) -> Option<&Deliverable> {
        self.items.iter().find(|d| d.tipo == tipo && d.is_active)
    }

    /// All versions of `tipo`, newest first.
    pub fn versions(&self, tipo: DeliverableType) -> Vec<&Deliverable> {
        let mut v: Vec<&Deliverable> = self.items.iter().filter(|d| d.tipo == tipo).collect();
        v.sort_by(|a, b| b.version.cmp(&a.version));
        v
    }

    pub fn next_version(&self, tipo: DeliverableType) -> u32 {
        self.items
            .iter()
            .filter(|d| d.tipo == tipo)
            .map(|d| d.version)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Record a freshly uploaded version: deactivate the previous active
    /// version of the same type and make `uploaded` the active one.
    pub fn apply_upload(&mut self, mut uploaded: Deliverable) {
        let next = self.next_version(uploaded.tipo);
        if uploaded.version < next {
            uploaded.version = next;
        }
        for d in self.items.iter_mut().filter(|d| d.tipo == uploaded.tipo) {
            d.is_active = false;
        }
        uploaded.is_active = true;
        self.items.push(uploaded);
    }

    /// At most one active version per type.
    pub fn check_invariant(&self) -> Result<(), CoreError> {
        for tipo in ALL_TYPES {
            let active = self
                .items
                .iter()
                .filter(|d| d.tipo == tipo && d.is_active)
                .count();
            if active > 1 {
                return Err(CoreError::Conflict(format!(
                    "{active} versiones activas para {}",
                    tipo.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn documents(&self) -> DocumentSet {
        DocumentSet {
            tesis: self.active(DeliverableType::Tesis).is_some(),
            user_manual: self.active(DeliverableType::ManualUsuario).is_some(),
            scientific_article: self.active(DeliverableType::Articulo).is_some(),
        }
    }
}

/// Validate a file before sending it to the upload endpoint.
pub fn validate_upload(file_name: &str, size_bytes: u64) -> Result<(), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation("El archivo está vacío".to_string()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "El archivo supera el tamaño máximo de {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "Formato no permitido '{file_name}'. Solo se aceptan: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

/// Which deliverables currently have an active version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSet {
    #[serde(default)]
    pub tesis: bool,
    #[serde(default)]
    pub user_manual: bool,
    #[serde(default)]
    pub scientific_article: bool,
}

impl DocumentSet {
    pub fn from_history(history: &DeliverableHistory) -> Self {
        history.documents()
    }

    pub fn has(&self, tipo: DeliverableType) -> bool {
        match tipo {
            DeliverableType::Tesis => self.tesis,
            DeliverableType::ManualUsuario => self.user_manual,
            DeliverableType::Articulo => self.scientific_article,
        }
    }

    pub fn ready(&self) -> bool {
        ALL_TYPES.iter().all(|t| self.has(*t))
    }

    pub fn missing(&self) -> Vec<DeliverableType> {
        ALL_TYPES.into_iter().filter(|t| !self.has(*t)).collect()
    }
}
