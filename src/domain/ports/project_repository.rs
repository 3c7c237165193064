//! Project repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ActivityLogEntry, ProjectRecord};

/// Repository interface for project persistence.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project.
    async fn create(&self, project: &ProjectRecord) -> DomainResult<()>;

    /// Get a project by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<ProjectRecord>>;

    /// Write the whole record and append `entry` to its activity log as one
    /// atomic unit. Either both are stored or neither is.
    ///
    /// `project.version` must be the version that was read; on success the
    /// stored version is incremented and the new value is returned.
    /// Fails with `ConcurrencyConflict` if another write got there first.
    async fn update_with_activity(
        &self,
        project: &ProjectRecord,
        entry: &ActivityLogEntry,
    ) -> DomainResult<u64>;

    /// Delete a project; its activity log goes with it.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
