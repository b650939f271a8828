//! Graduation prerequisites (english, internship, community service).
//!
//! Rows come from `/prerequisitos/dashboard`. Any record the backend omits
//! is treated as not verified, so a half-populated row degrades to
//! "pending" instead of failing to parse.

use serde::{Deserialize, Serialize};

use crate::reconcile::Identified;
use crate::search::matches_query;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrerequisiteKind {
    Ingles,
    Practicas,
    Vinculacion,
}

pub const ALL_KINDS: [PrerequisiteKind; 3] = [
    PrerequisiteKind::Ingles,
    PrerequisiteKind::Practicas,
    PrerequisiteKind::Vinculacion,
];

impl PrerequisiteKind {
    /// Path segment used by the upload and verify endpoints.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Ingles => "ingles",
            Self::Practicas => "practicas",
            Self::Vinculacion => "vinculacion",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ingles => "Suficiencia de inglés",
            Self::Practicas => "Prácticas preprofesionales",
            Self::Vinculacion => "Vinculación con la sociedad",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteRecord {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub archivo_url: Option<String>,
    #[serde(default)]
    pub verificado_por: Option<String>,
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPrerequisites {
    pub id: DbId,
    #[serde(default)]
    pub nombres: String,
    #[serde(default)]
    pub apellidos: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub english: Option<PrerequisiteRecord>,
    #[serde(default)]
    pub internship: Option<PrerequisiteRecord>,
    #[serde(default)]
    pub community: Option<PrerequisiteRecord>,
}

impl StudentPrerequisites {
    pub fn record(&self, kind: PrerequisiteKind) -> Option<&PrerequisiteRecord> {
        match kind {
            PrerequisiteKind::Ingles => self.english.as_ref(),
            PrerequisiteKind::Practicas => self.internship.as_ref(),
            PrerequisiteKind::Vinculacion => self.community.as_ref(),
        }
    }

    fn record_mut(&mut self, kind: PrerequisiteKind) -> &mut Option<PrerequisiteRecord> {
        match kind {
            PrerequisiteKind::Ingles => &mut self.english,
            PrerequisiteKind::Practicas => &mut self.internship,
            PrerequisiteKind::Vinculacion => &mut self.community,
        }
    }

    pub fn is_verified(&self, kind: PrerequisiteKind) -> bool {
        self.record(kind).is_some_and(|r| r.verified)
    }

    /// All three prerequisites verified.
    pub fn fully_verified(&self) -> bool {
        ALL_KINDS.iter().all(|k| self.is_verified(*k))
    }

    pub fn verified_count(&self) -> usize {
        ALL_KINDS.iter().filter(|k| self.is_verified(**k)).count()
    }

    /// Local patch of one flag; creates an empty record when missing.
    pub fn set_verified(&mut self, kind: PrerequisiteKind, verified: bool) {
        self.record_mut(kind)
            .get_or_insert_with(PrerequisiteRecord::default)
            .verified = verified;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombres, self.apellidos).trim().to_string()
    }
}

impl Identified for StudentPrerequisites {
    fn id(&self) -> DbId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrerequisiteFilter {
    #[default]
    All,
    Approved,
    Pending,
}

impl PrerequisiteFilter {
    pub fn matches(self, row: &StudentPrerequisites) -> bool {
        match self {
            Self::All => true,
            Self::Approved => row.fully_verified(),
            Self::Pending => !row.fully_verified(),
        }
    }
}

pub fn filter_students<'a>(
    rows: &'a [StudentPrerequisites],
    filter: PrerequisiteFilter,
    query: &str,
) -> Vec<&'a StudentPrerequisites> {
    rows.iter()
        .filter(|r| filter.matches(r))
        .filter(|r| {
            matches_query(
                &[r.nombres.as_str(), r.apellidos.as_str(), r.correo.as_str()],
                query,
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrerequisiteSummary {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
}

pub fn summarize(rows: &[StudentPrerequisites]) -> PrerequisiteSummary {
    let approved = rows.iter().filter(|r| r.fully_verified()).count();
    PrerequisiteSummary {
        total: rows.len(),
        approved,
        pending: rows.len() - approved,
    }
}
