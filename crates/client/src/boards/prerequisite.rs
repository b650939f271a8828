use std::sync::Arc;

use tesis_core::error::CoreError;
use tesis_core::prerequisite::{
    filter_students, summarize, PrerequisiteFilter, PrerequisiteKind, PrerequisiteSummary,
    StudentPrerequisites,
};
use tesis_core::reconcile::ReconciledList;
use tesis_core::roles::{Capability, Role};
use tesis_core::types::DbId;

use crate::error::ClientResult;
use crate::ports::PrerequisitePort;

/// Verification dashboard for english, internship and community service.
pub struct PrerequisiteBoard {
    port: Arc<dyn PrerequisitePort>,
    role: Role,
    list: ReconciledList<StudentPrerequisites>,
    filter: PrerequisiteFilter,
    query: String,
}

impl PrerequisiteBoard {
    pub fn new(port: Arc<dyn PrerequisitePort>, role: Role) -> Self {
        Self {
            port,
            role,
            list: ReconciledList::default(),
            filter: PrerequisiteFilter::default(),
            query: String::new(),
        }
    }

    pub async fn load(&mut self) {
        self.list.replace_all(self.port.dashboard().await);
    }

    pub fn set_filter(&mut self, filter: PrerequisiteFilter) {
        self.filter = filter;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn rows(&self) -> Vec<&StudentPrerequisites> {
        filter_students(self.list.items(), self.filter, &self.query)
    }

    pub fn student(&self, id: DbId) -> Option<&StudentPrerequisites> {
        self.list.get(id)
    }

    pub fn summary(&self) -> PrerequisiteSummary {
        summarize(self.list.items())
    }

    /// Bumped on each full reload; lets a view tell a reconcile happened.
    pub fn generation(&self) -> u64 {
        self.list.generation()
    }

    /// Flip one verification flag. The row changes immediately; if the
    /// backend rejects it the whole dashboard is reloaded.
    pub async fn toggle(&mut self, student_id: DbId, kind: PrerequisiteKind) -> ClientResult<bool> {
        self.role.require(Capability::VerifyPrerequisites)?;
        let verified = !self
            .list
            .get(student_id)
            .ok_or(CoreError::NotFound {
                entity: "Estudiante",
                id: student_id,
            })?
            .is_verified(kind);

        self.list
            .patch(student_id, |row| row.set_verified(kind, verified));

        match self.port.set_verified(student_id, kind, verified).await {
            Ok(()) => Ok(verified),
            Err(e) => {
                tracing::warn!(
                    student_id,
                    kind = kind.path_segment(),
                    error = %e,
                    "Prerequisite toggle failed, reloading dashboard",
                );
                self.load().await;
                Err(e)
            }
        }
    }
}
