//! Two-phase confirmation protocol for stage transitions.
//!
//! A request without `confirm` never persists anything that needs
//! confirmation; it gets back a descriptor instead. A confirmed request
//! re-runs every hard check against the freshly loaded record before
//! committing, so confirmation can never bypass them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ProjectRecord, Stage, TransitionData};
use crate::domain::ports::{ActivityRepository, ProjectRepository};
use crate::services::transition_engine::{
    StatusTransitionEngine, TransitionDecision, TransitionDescriptor,
};

/// Direction of a requested move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionAction {
    /// One stage forward
    Next,
    /// One stage back
    Previous,
}

/// A user's request to move a project one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Direction of the one-step move
    pub action: TransitionAction,
    /// Commit instead of returning a descriptor
    pub confirm: bool,
    /// Extra data written with a forward move; ignored on `Previous`
    pub data: TransitionData,
    /// Recorded on the activity entry
    pub actor: Option<String>,
}

impl TransitionRequest {
    /// Unconfirmed one-step advance.
    pub fn next() -> Self {
        Self {
            action: TransitionAction::Next,
            confirm: false,
            data: TransitionData::default(),
            actor: None,
        }
    }

    /// One-step revert.
    pub fn previous() -> Self {
        Self {
            action: TransitionAction::Previous,
            ..Self::next()
        }
    }

    /// Mark the request as confirmed.
    pub fn confirmed(mut self) -> Self {
        self.confirm = true;
        self
    }

    /// Set the data.
    pub fn with_data(mut self, data: TransitionData) -> Self {
        self.data = data;
        self
    }

    /// Set the actor.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// What the caller gets back from a transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The move was committed
    Applied(ProjectRecord),
    /// Already at the boundary; nothing was written
    Unchanged { project: ProjectRecord, message: String },
    /// Re-submit with the listed extra data
    NeedsInput(TransitionDescriptor),
    /// Re-submit with `confirm = true`
    NeedsConfirmation(TransitionDescriptor),
}

impl TransitionOutcome {
    /// Whether the record was written.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Two-phase front end for stage moves: preview without writing, then commit on `confirm`.
pub struct ConfirmationProtocol<P: ProjectRepository, A: ActivityRepository> {
    engine: Arc<StatusTransitionEngine<P, A>>,
}

impl<P: ProjectRepository, A: ActivityRepository> ConfirmationProtocol<P, A> {
    /// Wrap `engine`.
    pub fn new(engine: Arc<StatusTransitionEngine<P, A>>) -> Self {
        Self { engine }
    }

    /// Handle one transition request end to end.
    pub async fn submit(
        &self,
        project_id: Uuid,
        request: TransitionRequest,
    ) -> DomainResult<TransitionOutcome> {
        let record = self.engine.load(project_id).await?;

        let decision = match request.action {
            TransitionAction::Next => self.engine.advance(&record, &request.data),
            TransitionAction::Previous => self.engine.revert(&record),
        };

        tracing::debug!(
            project_id = %project_id,
            action = ?request.action,
            confirm = request.confirm,
            decision = ?decision,
            "transition evaluated"
        );

        match decision {
            TransitionDecision::NoChange { message, .. } => Ok(TransitionOutcome::Unchanged {
                project: record,
                message,
            }),
            TransitionDecision::NeedsInput { missing, .. } if request.confirm => {
                Err(DomainError::missing(missing))
            }
            TransitionDecision::NeedsInput { descriptor, .. } => {
                Ok(TransitionOutcome::NeedsInput(descriptor))
            }
            TransitionDecision::Rejected(rejection) => {
                tracing::info!(project_id = %project_id, reason = %rejection, "transition rejected");
                Err(rejection.into_error())
            }
            TransitionDecision::NeedsConfirmation(descriptor) if !request.confirm => {
                Ok(TransitionOutcome::NeedsConfirmation(descriptor))
            }
            TransitionDecision::NeedsConfirmation(descriptor) => {
                self.apply(&record, descriptor.to, request).await
            }
            TransitionDecision::Ready { to, .. } => self.apply(&record, to, request).await,
        }
    }

    async fn apply(
        &self,
        record: &ProjectRecord,
        to: Stage,
        request: TransitionRequest,
    ) -> DomainResult<TransitionOutcome> {
        let data = match request.action {
            TransitionAction::Next => request.data,
            TransitionAction::Previous => TransitionData::default(),
        };
        self.engine
            .commit(record, to, &data, request.actor)
            .await
            .map(TransitionOutcome::Applied)
    }
}
