//! Activity log entries: the append-only audit trail of a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of change an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Stage moved forward or backward
    StatusUpdate,
    /// Lost/hold or trouble flag changed
    FlagUpdate,
}

impl ActivityType {
    /// Tag stored in the `activity_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusUpdate => "status_update",
            Self::FlagUpdate => "flag_update",
        }
    }

    /// Parse a stored tag.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "status_update" => Some(Self::StatusUpdate),
            "flag_update" => Some(Self::FlagUpdate),
            _ => None,
        }
    }
}

/// One immutable entry in a project's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Entry identifier
    pub id: Uuid,
    /// Owning project; entries are deleted with it
    pub project_id: Uuid,
    /// Stage or flag change
    pub activity_type: ActivityType,
    /// Prose summary including the old and new values
    pub description: String,
    /// When the change was committed
    pub created_at: DateTime<Utc>,
    /// Who made the change, when known
    pub actor: Option<String>,
}

impl ActivityLogEntry {
    /// Entry for `project_id` stamped at `created_at`.
    pub fn new(
        project_id: Uuid,
        activity_type: ActivityType,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            activity_type,
            description: description.into(),
            created_at,
            actor: None,
        }
    }

    /// Set the actor.
    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_codec() {
        for t in [ActivityType::StatusUpdate, ActivityType::FlagUpdate] {
            assert_eq!(ActivityType::from_str(t.as_str()), Some(t));
        }
        assert!(ActivityType::from_str("comment").is_none());
    }
}
