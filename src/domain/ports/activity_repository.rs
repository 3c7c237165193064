//! Activity log repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::ActivityLogEntry;

/// Read side of the activity log.
///
/// Entries are written only together with the change they describe, see
/// [`ProjectRepository::update_with_activity`](super::ProjectRepository::update_with_activity).
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Entries for a project, oldest first.
    async fn list_for_project(&self, project_id: Uuid) -> DomainResult<Vec<ActivityLogEntry>>;
}
