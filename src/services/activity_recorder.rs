//! Activity recorder: builds and reads the project audit trail.
//!
//! Every committed stage change and flag change results in exactly one
//! entry, stored in the same transaction as the change itself.
//! Descriptions follow a fixed format that always names the old and the
//! new value.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ActivityLogEntry, ActivityType, DealResult, FieldChange, Stage};
use crate::domain::ports::{ActivityRepository, Clock};

/// Stamps activity entries with the clock and lists a project's history.
pub struct ActivityRecorder<A: ActivityRepository> {
    repo: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A: ActivityRepository> Clone for ActivityRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<A: ActivityRepository> ActivityRecorder<A> {
    /// Create a recorder reading from `repo`.
    pub fn new(repo: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Build the entry for a change to `project_id`, timestamped now.
    ///
    /// The caller stores it with
    /// [`ProjectRepository::update_with_activity`](crate::domain::ports::ProjectRepository::update_with_activity).
    pub fn entry(
        &self,
        project_id: Uuid,
        activity_type: ActivityType,
        description: String,
        actor: Option<String>,
    ) -> ActivityLogEntry {
        let entry = ActivityLogEntry::new(project_id, activity_type, description, self.clock.now())
            .with_actor(actor);
        tracing::debug!(
            project_id = %project_id,
            entry_id = %entry.id,
            activity_type = activity_type.as_str(),
            "activity entry prepared"
        );
        entry
    }

    /// Entries for a project, oldest first.
    pub async fn history(&self, project_id: Uuid) -> DomainResult<Vec<ActivityLogEntry>> {
        self.repo.list_for_project(project_id).await
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "installation_contractor" => "Installation contractor",
        "installation_date" => "Installation date",
        "revenue" => "Revenue",
        "delivery_date" => "Delivery date",
        "estimated_amount" => "Estimated amount",
        other => other,
    }
}

/// `Status: <old> -> <new>` followed by one `; <Field>: <old> -> <new>` per
/// extra field that changed.
pub fn describe_transition(from: Stage, to: Stage, changes: &[FieldChange]) -> String {
    let mut description = format!("Status: {} -> {}", from.label(), to.label());
    for change in changes {
        description.push_str(&format!(
            "; {}: {} -> {}",
            field_label(change.field),
            change.old.as_deref().unwrap_or("(none)"),
            change.new.as_deref().unwrap_or("(none)")
        ));
    }
    description
}

/// `Deal result: lost=.., hold=.. -> lost=.., hold=..`
pub fn describe_deal_result(from: DealResult, to: DealResult) -> String {
    format!("Deal result: {} -> {}", from.describe(), to.describe())
}

/// Trouble flag flip plus the assignee hand-over.
pub fn describe_trouble(raised: bool, old_assignee: &str, new_assignee: &str) -> String {
    format!(
        "Trouble flag: {} -> {}; Assignee: {} -> {}",
        !raised, raised, old_assignee, new_assignee
    )
}
