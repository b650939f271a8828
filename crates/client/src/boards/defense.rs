use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use tesis_core::defense::{
    ensure_assignment_allowed, public_status_for, validate_assignment, DefenseAssignment,
    DefenseAssignmentDraft, DefenseKind, DefenseRecord, DefenseUiStatus,
};
use tesis_core::deliverable::DocumentSet;
use tesis_core::error::CoreError;
use tesis_core::reconcile::ReconciledList;
use tesis_core::roles::{Capability, Role};
use tesis_core::types::DbId;
use tesis_core::workflow::{ConfirmationWorkflow, WorkflowState};

use crate::error::{ClientError, ClientResult};
use crate::ports::{DefensePort, DeliverablePort};

/// One defense as rendered on a board.
#[derive(Debug, Clone, PartialEq)]
pub struct DefenseCard {
    pub id: DbId,
    pub propuesta_id: DbId,
    pub titulo: Option<String>,
    pub estudiante: Option<String>,
    pub status: DefenseUiStatus,
    pub documents: DocumentSet,
}

// ---------------------------------------------------------------------------
// Private defenses
// ---------------------------------------------------------------------------

pub struct PrivateDefenseBoard {
    defenses: Arc<dyn DefensePort>,
    deliverables: Arc<dyn DeliverablePort>,
    role: Role,
    list: ReconciledList<DefenseRecord>,
    /// Keyed by proposal id.
    documents: HashMap<DbId, DocumentSet>,
    /// Defense whose assignment dialog is open.
    dialog: Option<DbId>,
    workflow: ConfirmationWorkflow<DefenseAssignment>,
}

impl PrivateDefenseBoard {
    pub fn new(
        defenses: Arc<dyn DefensePort>,
        deliverables: Arc<dyn DeliverablePort>,
        role: Role,
    ) -> Self {
        Self {
            defenses,
            deliverables,
            role,
            list: ReconciledList::default(),
            documents: HashMap::new(),
            dialog: None,
            workflow: ConfirmationWorkflow::new(),
        }
    }

    /// Reload defenses and the document readiness of their proposals.
    pub async fn load(&mut self) {
        let records = self.defenses.defenses(DefenseKind::Privada).await;
        let mut documents = HashMap::with_capacity(records.len());
        for record in &records {
            if !documents.contains_key(&record.propuesta_id) {
                let docs = self.deliverables.documents(record.propuesta_id).await;
                documents.insert(record.propuesta_id, docs);
            }
        }
        self.list.replace_all(records);
        self.documents = documents;
    }

    pub fn records(&self) -> &[DefenseRecord] {
        self.list.items()
    }

    fn documents_for(&self, propuesta_id: DbId) -> DocumentSet {
        self.documents.get(&propuesta_id).copied().unwrap_or_default()
    }

    pub fn cards(&self) -> Vec<DefenseCard> {
        self.list
            .items()
            .iter()
            .map(|r| DefenseCard {
                id: r.id,
                propuesta_id: r.propuesta_id,
                titulo: r.titulo.clone(),
                estudiante: r.estudiante.clone(),
                status: r.ui_status(),
                documents: self.documents_for(r.propuesta_id),
            })
            .collect()
    }

    pub fn card(&self, id: DbId) -> Option<DefenseCard> {
        self.cards().into_iter().find(|c| c.id == id)
    }

    pub fn dialog(&self) -> Option<DbId> {
        self.dialog
    }

    pub fn workflow(&self) -> &ConfirmationWorkflow<DefenseAssignment> {
        &self.workflow
    }

    /// Open the schedule/tribunal dialog, subject to the readiness gate.
    pub fn open_assignment(&mut self, id: DbId) -> ClientResult<()> {
        self.role.require(Capability::ScheduleDefense)?;
        let record = self.list.get(id).ok_or(CoreError::NotFound {
            entity: "Defensa",
            id,
        })?;
        ensure_assignment_allowed(record.ui_status(), &self.documents_for(record.propuesta_id))?;
        self.dialog = Some(id);
        Ok(())
    }

    /// Validate the dialog input and stage it. No request is sent.
    pub fn stage(&mut self, draft: &DefenseAssignmentDraft, today: NaiveDate) -> ClientResult<()> {
        if self.dialog != Some(draft.defense_id) {
            return Err(CoreError::Precondition(
                "El diálogo de asignación no está abierto para esta defensa".to_string(),
            )
            .into());
        }
        let assignment = validate_assignment(draft, today)?;
        self.workflow.stage(assignment)?;
        Ok(())
    }

    pub fn open_confirmation(&mut self) -> ClientResult<&DefenseAssignment> {
        Ok(self.workflow.open_confirmation()?)
    }

    /// Close the dialog and drop anything staged.
    pub fn cancel(&mut self) -> ClientResult<()> {
        if matches!(
            self.workflow.state(),
            WorkflowState::Staged(_) | WorkflowState::Confirming(_)
        ) {
            self.workflow.cancel()?;
        }
        self.dialog = None;
        Ok(())
    }

    /// Schedule, then assign the tribunal. If either call fails the
    /// workflow ends `Failed`; the list is reloaded in both cases.
    pub async fn confirm(&mut self) -> ClientResult<()> {
        let assignment = self.workflow.confirm()?;
        let result = self.submit(&assignment).await;
        match &result {
            Ok(()) => {
                self.workflow.complete(Ok(()))?;
                self.dialog = None;
                tracing::info!(defensa_id = assignment.defense_id, "Private defense assigned");
            }
            Err(e) => {
                tracing::warn!(defensa_id = assignment.defense_id, error = %e, "Private defense assignment failed");
                self.workflow.complete(Err(e.user_message()))?;
            }
        }
        self.load().await;
        result
    }

    async fn submit(&self, assignment: &DefenseAssignment) -> Result<(), ClientError> {
        self.defenses
            .schedule(DefenseKind::Privada, assignment.defense_id, &assignment.schedule)
            .await?;
        self.defenses
            .assign_participants(DefenseKind::Privada, assignment.defense_id, &assignment.tribunal)
            .await
    }
}

// ---------------------------------------------------------------------------
// Public defenses
// ---------------------------------------------------------------------------

/// Public defenses stay locked until the paired private defense passes.
pub struct PublicDefenseBoard {
    defenses: Arc<dyn DefensePort>,
    list: ReconciledList<DefenseRecord>,
    /// Private defense per proposal id.
    private: HashMap<DbId, DefenseRecord>,
}

impl PublicDefenseBoard {
    pub fn new(defenses: Arc<dyn DefensePort>) -> Self {
        Self {
            defenses,
            list: ReconciledList::default(),
            private: HashMap::new(),
        }
    }

    pub async fn load(&mut self) {
        let public = self.defenses.defenses(DefenseKind::Publica).await;
        self.private = self
            .defenses
            .defenses(DefenseKind::Privada)
            .await
            .into_iter()
            .map(|r| (r.propuesta_id, r))
            .collect();
        self.list.replace_all(public);
    }

    pub fn status(&self, id: DbId) -> Option<DefenseUiStatus> {
        let record = self.list.get(id)?;
        Some(public_status_for(
            record.estado,
            self.private.get(&record.propuesta_id),
        ))
    }

    pub fn cards(&self) -> Vec<DefenseCard> {
        self.list
            .items()
            .iter()
            .map(|r| DefenseCard {
                id: r.id,
                propuesta_id: r.propuesta_id,
                titulo: r.titulo.clone(),
                estudiante: r.estudiante.clone(),
                status: public_status_for(r.estado, self.private.get(&r.propuesta_id)),
                documents: DocumentSet::default(),
            })
            .collect()
    }

    /// Fail with `Precondition` while the defense is locked.
    pub fn ensure_unlocked(&self, id: DbId) -> ClientResult<()> {
        match self.status(id) {
            None => Err(CoreError::NotFound {
                entity: "Defensa",
                id,
            }
            .into()),
            Some(DefenseUiStatus::Locked) => Err(CoreError::Precondition(
                "La defensa pública se habilita al aprobar la defensa privada".to_string(),
            )
            .into()),
            Some(_) => Ok(()),
        }
    }
}
