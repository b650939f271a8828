//! Seams between the boards and the backend.
//!
//! [`Backend`] implements every port over HTTP; tests plug in in-memory
//! fakes. Reads never fail (the services already log and swallow), so only
//! mutations return [`ClientResult`].

use async_trait::async_trait;

use tesis_core::defense::{DefenseKind, DefenseRecord, Schedule, Tribunal};
use tesis_core::deliverable::DocumentSet;
use tesis_core::notification::Notification;
use tesis_core::prerequisite::{PrerequisiteKind, StudentPrerequisites};
use tesis_core::proposal::Proposal;
use tesis_core::tutoring::{AssignTutorRequest, TutoringAssignment};
use tesis_core::types::DbId;
use tesis_core::user::Docente;

use crate::error::ClientResult;
use crate::services::Backend;

#[async_trait]
pub trait ProposalPort: Send + Sync {
    async fn proposals(&self) -> Vec<Proposal>;
}

#[async_trait]
pub trait TutoringPort: Send + Sync {
    async fn tutors(&self) -> Vec<Docente>;
    async fn assignments(&self) -> Vec<TutoringAssignment>;
    async fn assign_tutor(&self, request: AssignTutorRequest) -> ClientResult<()>;
}

#[async_trait]
pub trait DefensePort: Send + Sync {
    async fn defenses(&self, kind: DefenseKind) -> Vec<DefenseRecord>;
    async fn schedule(&self, kind: DefenseKind, id: DbId, schedule: &Schedule) -> ClientResult<()>;
    async fn assign_participants(
        &self,
        kind: DefenseKind,
        id: DbId,
        tribunal: &Tribunal,
    ) -> ClientResult<()>;
}

#[async_trait]
pub trait DeliverablePort: Send + Sync {
    async fn documents(&self, propuesta_id: DbId) -> DocumentSet;
}

#[async_trait]
pub trait PrerequisitePort: Send + Sync {
    async fn dashboard(&self) -> Vec<StudentPrerequisites>;
    async fn set_verified(
        &self,
        student_id: DbId,
        kind: PrerequisiteKind,
        verified: bool,
    ) -> ClientResult<()>;
}

#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notifications(&self) -> Vec<Notification>;
    async fn unread_count(&self) -> Option<u64>;
    async fn mark_read(&self, id: DbId) -> ClientResult<()>;
    async fn mark_all_read(&self) -> ClientResult<()>;
    async fn delete(&self, id: DbId) -> ClientResult<()>;
}

// ---------------------------------------------------------------------------
// HTTP implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl ProposalPort for Backend {
    async fn proposals(&self) -> Vec<Proposal> {
        self.proposals.list().await
    }
}

#[async_trait]
impl TutoringPort for Backend {
    async fn tutors(&self) -> Vec<Docente> {
        self.docentes.tutors().await
    }

    async fn assignments(&self) -> Vec<TutoringAssignment> {
        self.tutoring.list().await
    }

    async fn assign_tutor(&self, request: AssignTutorRequest) -> ClientResult<()> {
        self.tutoring.assign(request).await.map(|_| ())
    }
}

#[async_trait]
impl DefensePort for Backend {
    async fn defenses(&self, kind: DefenseKind) -> Vec<DefenseRecord> {
        self.defenses.list(kind).await
    }

    async fn schedule(&self, kind: DefenseKind, id: DbId, schedule: &Schedule) -> ClientResult<()> {
        self.defenses.schedule(kind, id, schedule).await.map(|_| ())
    }

    async fn assign_participants(
        &self,
        kind: DefenseKind,
        id: DbId,
        tribunal: &Tribunal,
    ) -> ClientResult<()> {
        self.defenses
            .assign_participants(kind, id, tribunal)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl DeliverablePort for Backend {
    async fn documents(&self, propuesta_id: DbId) -> DocumentSet {
        self.entregables.documents(propuesta_id).await
    }
}

#[async_trait]
impl PrerequisitePort for Backend {
    async fn dashboard(&self) -> Vec<StudentPrerequisites> {
        self.prerequisites.dashboard().await
    }

    async fn set_verified(
        &self,
        student_id: DbId,
        kind: PrerequisiteKind,
        verified: bool,
    ) -> ClientResult<()> {
        self.prerequisites.verify(student_id, kind, verified).await
    }
}

#[async_trait]
impl NotificationPort for Backend {
    async fn notifications(&self) -> Vec<Notification> {
        self.notifications.list().await
    }

    async fn unread_count(&self) -> Option<u64> {
        self.notifications.unread_count().await
    }

    async fn mark_read(&self, id: DbId) -> ClientResult<()> {
        self.notifications.mark_read(id).await
    }

    async fn mark_all_read(&self) -> ClientResult<()> {
        self.notifications.mark_all_read().await
    }

    async fn delete(&self, id: DbId) -> ClientResult<()> {
        self.notifications.delete(id).await
    }
}
