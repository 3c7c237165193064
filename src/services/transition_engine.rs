//! Status transition engine.
//!
//! Moves a project one stage at a time. Planning (`advance`, `revert`) is
//! pure and returns a [`TransitionDecision`]; [`StatusTransitionEngine::commit`]
//! persists the record, appends exactly one activity entry and emits a
//! best-effort notification.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityType, ProjectRecord, Stage, TransitionData};
use crate::domain::ports::{ActivityRepository, ChangeNotice, Clock, Notifier, ProjectRepository};
use crate::services::activity_recorder::{describe_transition, ActivityRecorder};
use crate::services::notify::notify_best_effort;
use crate::services::stage_policy::{Rejection, StagePolicy, StagePolicyTable};

/// What a descriptor asks the caller for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Re-submit with `confirm = true`
    Confirmation,
    /// Re-submit with installation contractor and date
    InstallationInfo,
}

/// Snapshot of the values a user should review before re-submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentValues {
    /// Stage the project is in
    pub stage: Stage,
    /// Stage the move would reach
    pub next_stage: Stage,
    /// Stored delivery date
    pub delivery_date: Option<NaiveDate>,
    /// Stored contractor, if booked
    pub installation_contractor: Option<String>,
    /// Stored installation date
    pub installation_date: Option<NaiveDate>,
    /// Recorded revenue
    pub revenue: Option<i64>,
    /// Estimated deal amount
    pub estimated_amount: Option<i64>,
}

impl CurrentValues {
    fn of(record: &ProjectRecord, next_stage: Stage) -> Self {
        Self {
            stage: record.stage,
            next_stage,
            delivery_date: record.delivery_date,
            installation_contractor: record.installation_contractor.clone(),
            installation_date: record.installation_date,
            revenue: record.revenue,
            estimated_amount: record.estimated_amount,
        }
    }
}

/// Returned instead of committing when the caller has to act first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionDescriptor {
    /// What the retry must add
    pub kind: DescriptorKind,
    /// Text to show the user
    pub message: String,
    /// Stage before the move
    pub from: Stage,
    /// Stage after the move
    pub to: Stage,
    /// Fields the retry must supply
    pub required_fields: Vec<&'static str>,
    /// Snapshot for the user to review
    pub current_values: CurrentValues,
}

/// Result of planning a one-step move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDecision {
    /// Boundary reached; nothing to do
    NoChange { stage: Stage, message: String },
    /// Required extra data was not supplied at all
    NeedsInput {
        descriptor: TransitionDescriptor,
        missing: Vec<&'static str>,
    },
    /// Hard checks passed; the user must confirm
    NeedsConfirmation(TransitionDescriptor),
    /// A hard check failed
    Rejected(Rejection),
    /// May commit without further input
    Ready { from: Stage, to: Stage },
}

/// Plans and commits one-stage moves.
pub struct StatusTransitionEngine<P: ProjectRepository, A: ActivityRepository> {
    projects: Arc<P>,
    recorder: ActivityRecorder<A>,
    policies: StagePolicyTable,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl<P: ProjectRepository, A: ActivityRepository> StatusTransitionEngine<P, A> {
    /// Create a new value.
    pub fn new(
        projects: Arc<P>,
        recorder: ActivityRecorder<A>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            projects,
            recorder,
            policies: StagePolicyTable::new(),
            clock,
            notifier,
        }
    }

    /// Load a project or fail with `ProjectNotFound`.
    pub async fn load(&self, id: Uuid) -> DomainResult<ProjectRecord> {
        self.projects
            .get(id)
            .await?
            .ok_or(DomainError::ProjectNotFound(id))
    }

    /// Evaluate the policy for moving `record` one stage forward.
    pub fn policy_for_advance(&self, record: &ProjectRecord, data: &TransitionData) -> StagePolicy {
        self.policies.evaluate(
            record.stage,
            record.stage.next(),
            record,
            data,
            self.clock.today(),
        )
    }

    /// Plan a one-step forward move. Never touches storage.
    pub fn advance(&self, record: &ProjectRecord, data: &TransitionData) -> TransitionDecision {
        if record.stage.is_last() {
            return TransitionDecision::NoChange {
                stage: record.stage,
                message: "Project is already at the final stage".to_string(),
            };
        }

        let policy = self.policy_for_advance(record, data);
        let current_values = CurrentValues::of(record, policy.to);

        match policy.rejection {
            Some(Rejection::MissingFields(missing))
                if !policy.requires_extra_data.is_empty() && data.installation.is_none() =>
            {
                TransitionDecision::NeedsInput {
                    descriptor: TransitionDescriptor {
                        kind: DescriptorKind::InstallationInfo,
                        message: format!(
                            "Installation contractor and date are required before moving to {}",
                            policy.to.label()
                        ),
                        from: policy.from,
                        to: policy.to,
                        required_fields: policy.requires_extra_data.iter().copied().collect(),
                        current_values,
                    },
                    missing,
                }
            }
            Some(rejection) => TransitionDecision::Rejected(rejection),
            None if policy.requires_confirmation => {
                TransitionDecision::NeedsConfirmation(TransitionDescriptor {
                    kind: DescriptorKind::Confirmation,
                    message: policy.confirmation_message.unwrap_or_default(),
                    from: policy.from,
                    to: policy.to,
                    required_fields: Vec::new(),
                    current_values,
                })
            }
            None => TransitionDecision::Ready {
                from: policy.from,
                to: policy.to,
            },
        }
    }

    /// Plan a one-step backward move. Reverts carry no policy.
    pub fn revert(&self, record: &ProjectRecord) -> TransitionDecision {
        if record.stage.is_first() {
            return TransitionDecision::NoChange {
                stage: record.stage,
                message: "Project is already at the first stage".to_string(),
            };
        }
        TransitionDecision::Ready {
            from: record.stage,
            to: record.stage.previous(),
        }
    }

    /// Persist the move to `to`, writing every supplied extra field and the
    /// activity entry describing them in one transaction.
    pub async fn commit(
        &self,
        record: &ProjectRecord,
        to: Stage,
        data: &TransitionData,
        actor: Option<String>,
    ) -> DomainResult<ProjectRecord> {
        let mut updated = record.clone();
        let from = updated.stage;
        let changes = updated.apply_transition(to, data, self.clock.now());

        let description = describe_transition(from, to, &changes);
        let entry = self.recorder.entry(
            updated.id,
            ActivityType::StatusUpdate,
            description.clone(),
            actor.clone(),
        );
        updated.version = self.projects.update_with_activity(&updated, &entry).await?;

        tracing::info!(
            project_id = %updated.id,
            from = from.as_str(),
            to = to.as_str(),
            version = updated.version,
            "project stage changed"
        );

        notify_best_effort(
            self.notifier.as_ref(),
            ChangeNotice {
                project_id: updated.id,
                activity_type: ActivityType::StatusUpdate,
                description,
                actor,
            },
        )
        .await;

        Ok(updated)
    }
}
