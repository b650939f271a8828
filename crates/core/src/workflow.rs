//! Confirm-then-submit workflow shared by every mutating dialog.
//!
//! ```text
//! Idle --stage--> Staged --open_confirmation--> Confirming --confirm--> Submitting
//!                   ^  \                           |                     |
//!                   |   `----------cancel----------+--> Idle             +--complete--> Succeeded | Failed
//!                   `------------------------stage------------------------------------------'
//! ```
//!
//! A submission in flight cannot be cancelled; `reset` returns a finished
//! workflow to `Idle`.

use std::fmt;

/// Current step. The staged payload travels with the state that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<T> {
    Idle,
    Staged(T),
    Confirming(T),
    Submitting(T),
    Succeeded,
    Failed(String),
}

impl<T> WorkflowState<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Staged(_) => "staged",
            Self::Confirming(_) => "confirming",
            Self::Submitting(_) => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Stage,
    OpenConfirmation,
    Confirm,
    Complete,
    Cancel,
    Reset,
}

impl WorkflowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::OpenConfirmation => "open_confirmation",
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid workflow transition: cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: WorkflowAction,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationWorkflow<T> {
    state: WorkflowState<T>,
}

impl<T> Default for ConfirmationWorkflow<T> {
    fn default() -> Self {
        Self {
            state: WorkflowState::Idle,
        }
    }
}

impl<T> ConfirmationWorkflow<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState<T> {
        &self.state
    }

    fn invalid(&self, action: WorkflowAction) -> WorkflowError {
        WorkflowError::InvalidTransition {
            from: self.state.name(),
            action,
        }
    }

    /// Payload held by the staged, confirming or submitting step.
    pub fn pending(&self) -> Option<&T> {
        match &self.state {
            WorkflowState::Staged(t) | WorkflowState::Confirming(t) | WorkflowState::Submitting(t) => {
                Some(t)
            }
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, WorkflowState::Submitting(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Stage (or re-stage) validated input. Not allowed while confirming
    /// or submitting.
    pub fn stage(&mut self, data: T) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Idle
            | WorkflowState::Staged(_)
            | WorkflowState::Succeeded
            | WorkflowState::Failed(_) => {
                self.state = WorkflowState::Staged(data);
                Ok(())
            }
            _ => Err(self.invalid(WorkflowAction::Stage)),
        }
    }

    /// Show the confirmation summary. The returned reference is exactly the
    /// staged data.
    pub fn open_confirmation(&mut self) -> Result<&T, WorkflowError> {
        if !matches!(self.state, WorkflowState::Staged(_)) {
            return Err(self.invalid(WorkflowAction::OpenConfirmation));
        }
        if let WorkflowState::Staged(t) = std::mem::replace(&mut self.state, WorkflowState::Idle) {
            self.state = WorkflowState::Confirming(t);
        }
        match &self.state {
            WorkflowState::Confirming(t) => Ok(t),
            _ => Err(self.invalid(WorkflowAction::OpenConfirmation)),
        }
    }

    /// Return to `Idle`, discarding staged data.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Staged(_) | WorkflowState::Confirming(_) => {
                self.state = WorkflowState::Idle;
                Ok(())
            }
            _ => Err(self.invalid(WorkflowAction::Cancel)),
        }
    }

    /// Record the outcome of the submission.
    pub fn complete(&mut self, outcome: Result<(), String>) -> Result<(), WorkflowError> {
        if !self.is_submitting() {
            return Err(self.invalid(WorkflowAction::Complete));
        }
        self.state = match outcome {
            Ok(()) => WorkflowState::Succeeded,
            Err(msg) => WorkflowState::Failed(msg),
        };
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Succeeded | WorkflowState::Failed(_) => {
                self.state = WorkflowState::Idle;
                Ok(())
            }
            _ => Err(self.invalid(WorkflowAction::Reset)),
        }
    }
}

impl<T: Clone> ConfirmationWorkflow<T> {
    /// Accept the confirmation and hand back the payload to submit.
    pub fn confirm(&mut self) -> Result<T, WorkflowError> {
        match &self.state {
            WorkflowState::Confirming(t) => {
                let payload = t.clone();
                self.state = WorkflowState::Submitting(payload.clone());
                Ok(payload)
            }
            _ => Err(self.invalid(WorkflowAction::Confirm)),
        }
    }
}
