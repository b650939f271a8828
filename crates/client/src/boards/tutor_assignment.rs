use std::sync::Arc;

use tesis_core::error::CoreError;
use tesis_core::proposal::Proposal;
use tesis_core::reconcile::ReconciledList;
use tesis_core::roles::{Capability, Role};
use tesis_core::tutoring::{ensure_assignable, ensure_single_active, AssignTutorRequest};
use tesis_core::types::DbId;
use tesis_core::user::Docente;
use tesis_core::workflow::ConfirmationWorkflow;

use crate::error::ClientResult;
use crate::ports::{ProposalPort, TutoringPort};

/// What the confirmation dialog shows before a tutor is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorAssignment {
    pub propuesta_id: DbId,
    pub titulo: String,
    pub estudiante: String,
    pub tutor: Docente,
}

impl TutorAssignment {
    pub fn request(&self) -> AssignTutorRequest {
        AssignTutorRequest {
            propuesta_id: self.propuesta_id,
            tutor_id: self.tutor.id,
        }
    }
}

/// Director/coordinator screen listing proposals and their tutor.
pub struct TutorAssignmentBoard {
    proposals: Arc<dyn ProposalPort>,
    tutoring: Arc<dyn TutoringPort>,
    role: Role,
    list: ReconciledList<Proposal>,
    tutors: Vec<Docente>,
    query: String,
    workflow: ConfirmationWorkflow<TutorAssignment>,
}

impl TutorAssignmentBoard {
    pub fn new(proposals: Arc<dyn ProposalPort>, tutoring: Arc<dyn TutoringPort>, role: Role) -> Self {
        Self {
            proposals,
            tutoring,
            role,
            list: ReconciledList::default(),
            tutors: Vec::new(),
            query: String::new(),
            workflow: ConfirmationWorkflow::new(),
        }
    }

    pub async fn load(&mut self) {
        self.list.replace_all(self.proposals.proposals().await);
        self.tutors = self.tutoring.tutors().await;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Proposals matching the current search.
    pub fn rows(&self) -> Vec<&Proposal> {
        self.list
            .items()
            .iter()
            .filter(|p| p.matches(&self.query))
            .collect()
    }

    pub fn proposal(&self, id: DbId) -> Option<&Proposal> {
        self.list.get(id)
    }

    pub fn tutors(&self) -> &[Docente] {
        &self.tutors
    }

    pub fn workflow(&self) -> &ConfirmationWorkflow<TutorAssignment> {
        &self.workflow
    }

    /// Pick a tutor for a proposal. Nothing is sent yet.
    pub fn stage(&mut self, propuesta_id: DbId, tutor_id: DbId) -> ClientResult<()> {
        self.role.require(Capability::AssignTutor)?;
        let proposal = self.list.get(propuesta_id);
        ensure_assignable(proposal, propuesta_id)?;
        let tutor = self
            .tutors
            .iter()
            .find(|t| t.id == tutor_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "Docente",
                id: tutor_id,
            })?;
        let staged = TutorAssignment {
            propuesta_id,
            titulo: proposal.map(|p| p.titulo.clone()).unwrap_or_default(),
            estudiante: proposal.map(Proposal::student_name).unwrap_or_default(),
            tutor,
        };
        self.workflow.stage(staged)?;
        Ok(())
    }

    pub fn open_confirmation(&mut self) -> ClientResult<&TutorAssignment> {
        Ok(self.workflow.open_confirmation()?)
    }

    pub fn cancel(&mut self) -> ClientResult<()> {
        Ok(self.workflow.cancel()?)
    }

    pub fn reset(&mut self) -> ClientResult<()> {
        Ok(self.workflow.reset()?)
    }

    /// Send the staged assignment, then reload the list either way.
    ///
    /// A proposal left with more than one active assignment fails the
    /// workflow with a conflict.
    pub async fn confirm(&mut self) -> ClientResult<()> {
        let staged = self.workflow.confirm()?;
        let mut result = self.tutoring.assign_tutor(staged.request()).await;
        if result.is_ok() {
            let assignments = self.tutoring.assignments().await;
            if let Err(e) = ensure_single_active(&assignments, staged.propuesta_id) {
                result = Err(e.into());
            }
        }
        match &result {
            Ok(()) => {
                self.workflow.complete(Ok(()))?;
                tracing::info!(
                    propuesta_id = staged.propuesta_id,
                    tutor = %staged.tutor.display_name(),
                    "Tutor assignment confirmed",
                );
            }
            Err(e) => {
                tracing::warn!(propuesta_id = staged.propuesta_id, error = %e, "Tutor assignment failed");
                self.workflow.complete(Err(e.user_message()))?;
            }
        }
        self.list.replace_all(self.proposals.proposals().await);
        result
    }
}
