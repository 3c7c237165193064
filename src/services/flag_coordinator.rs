//! Flag coordinator: lost/hold deal result and the trouble flag.
//!
//! Flag changes have no preview phase. Each one that actually changes the
//! record is a single versioned update followed by exactly one activity
//! entry. Requests that would leave the record as it is write nothing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityType, DealResult, ProjectRecord};
use crate::domain::ports::{ActivityRepository, ChangeNotice, Clock, Notifier, ProjectRepository};
use crate::services::activity_recorder::{describe_deal_result, describe_trouble, ActivityRecorder};
use crate::services::notify::notify_best_effort;

/// Toggle-style deal result action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleAction {
    /// Flip lost; turning it on clears hold
    ToggleLost,
    /// Flip hold; turning it on clears lost
    ToggleHold,
}

/// Explicit deal result action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealAction {
    /// Force lost
    Lost,
    /// Force hold
    Hold,
    /// Clear both
    Clear,
}

impl DealAction {
    /// Deal result this action forces.
    pub fn target(self) -> DealResult {
        match self {
            Self::Lost => DealResult::Lost,
            Self::Hold => DealResult::Hold,
            Self::Clear => DealResult::Active,
        }
    }
}

/// Result of a trouble flag request.
#[derive(Debug, Clone, PartialEq)]
pub struct TroubleUpdate {
    /// Record after the request
    pub project: ProjectRecord,
    /// Human-readable outcome
    pub message: String,
    /// Whether the record was written
    pub changed: bool,
}

/// Applies lost/hold and trouble flag changes, one logged write per real change.
pub struct FlagCoordinator<P: ProjectRepository, A: ActivityRepository> {
    projects: Arc<P>,
    recorder: ActivityRecorder<A>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    trouble_assignee: String,
}

impl<P: ProjectRepository, A: ActivityRepository> FlagCoordinator<P, A> {
    /// `trouble_assignee` takes over troubled projects.
    pub fn new(
        projects: Arc<P>,
        recorder: ActivityRecorder<A>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        trouble_assignee: impl Into<String>,
    ) -> Self {
        Self {
            projects,
            recorder,
            clock,
            notifier,
            trouble_assignee: trouble_assignee.into(),
        }
    }

    async fn load(&self, id: Uuid) -> DomainResult<ProjectRecord> {
        self.projects
            .get(id)
            .await?
            .ok_or(DomainError::ProjectNotFound(id))
    }

    /// Mark the deal lost, clearing hold.
    pub async fn set_lost(&self, id: Uuid, actor: Option<String>) -> DomainResult<ProjectRecord> {
        self.apply_deal_action(id, DealAction::Lost, actor).await
    }

    /// Put the deal on hold, clearing lost.
    pub async fn set_hold(&self, id: Uuid, actor: Option<String>) -> DomainResult<ProjectRecord> {
        self.apply_deal_action(id, DealAction::Hold, actor).await
    }

    /// Clear both lost and hold.
    pub async fn clear(&self, id: Uuid, actor: Option<String>) -> DomainResult<ProjectRecord> {
        self.apply_deal_action(id, DealAction::Clear, actor).await
    }

    /// Force the deal result to the action's target.
    pub async fn apply_deal_action(
        &self,
        id: Uuid,
        action: DealAction,
        actor: Option<String>,
    ) -> DomainResult<ProjectRecord> {
        let record = self.load(id).await?;
        self.write_deal_result(record, action.target(), actor).await
    }

    /// Flip lost or hold; turning one on turns the other off.
    pub async fn toggle(
        &self,
        id: Uuid,
        action: ToggleAction,
        actor: Option<String>,
    ) -> DomainResult<ProjectRecord> {
        let record = self.load(id).await?;
        let target = match action {
            ToggleAction::ToggleLost => record.deal_result.toggled_lost(),
            ToggleAction::ToggleHold => record.deal_result.toggled_hold(),
        };
        self.write_deal_result(record, target, actor).await
    }

    async fn write_deal_result(
        &self,
        mut record: ProjectRecord,
        target: DealResult,
        actor: Option<String>,
    ) -> DomainResult<ProjectRecord> {
        if record.deal_result == target {
            tracing::debug!(project_id = %record.id, deal_result = target.as_str(), "deal result unchanged");
            return Ok(record);
        }

        let previous = record.set_deal_result(target, self.clock.now());
        self.save_and_notify(&mut record, describe_deal_result(previous, target), actor)
            .await?;

        tracing::info!(
            project_id = %record.id,
            from = previous.as_str(),
            to = target.as_str(),
            "deal result changed"
        );
        Ok(record)
    }

    /// Raise or clear the trouble flag.
    ///
    /// Raising hands the project to the configured trouble assignee and
    /// saves the current one; clearing restores it. Raising an already
    /// troubled project keeps the original saved assignee.
    pub async fn set_trouble(
        &self,
        id: Uuid,
        flag: bool,
        actor: Option<String>,
    ) -> DomainResult<TroubleUpdate> {
        let mut record = self.load(id).await?;
        let old_assignee = record.assignee.clone();
        let now = self.clock.now();

        let changed = if flag {
            record.raise_trouble(&self.trouble_assignee, now)
        } else {
            record.clear_trouble(now)
        };

        if !changed {
            let message = if flag {
                "Trouble flag is already set"
            } else {
                "Trouble flag is already clear"
            };
            return Ok(TroubleUpdate {
                project: record,
                message: message.to_string(),
                changed: false,
            });
        }

        let description = describe_trouble(flag, &old_assignee, &record.assignee);
        self.save_and_notify(&mut record, description, actor).await?;

        tracing::info!(
            project_id = %record.id,
            trouble = flag,
            from_assignee = %old_assignee,
            to_assignee = %record.assignee,
            "trouble flag changed"
        );

        let message = if flag {
            format!("Trouble flag set; project reassigned to {}", record.assignee)
        } else {
            format!("Trouble flag cleared; project returned to {}", record.assignee)
        };
        Ok(TroubleUpdate {
            project: record,
            message,
            changed: true,
        })
    }

    /// Store the mutated record together with its flag entry.
    async fn save_and_notify(
        &self,
        record: &mut ProjectRecord,
        description: String,
        actor: Option<String>,
    ) -> DomainResult<()> {
        let entry = self.recorder.entry(
            record.id,
            ActivityType::FlagUpdate,
            description.clone(),
            actor.clone(),
        );
        record.version = self.projects.update_with_activity(record, &entry).await?;
        notify_best_effort(
            self.notifier.as_ref(),
            ChangeNotice {
                project_id: record.id,
                activity_type: ActivityType::FlagUpdate,
                description,
                actor,
            },
        )
        .await;
        Ok(())
    }
}
