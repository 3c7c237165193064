//! SQLite implementation of the ActivityRepository.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityLogEntry, ActivityType};
use crate::domain::ports::ActivityRepository;

/// SQLite-backed activity log.
#[derive(Clone)]
pub struct SqliteActivityRepository {
    pool: SqlitePool,
}

impl SqliteActivityRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert one entry on `conn`, normally inside the caller's transaction.
pub(super) async fn insert_entry(
    conn: &mut SqliteConnection,
    entry: &ActivityLogEntry,
) -> DomainResult<()> {
    sqlx::query(
        r#"INSERT INTO activity_log (id, project_id, activity_type, description, actor, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#
    )
    .bind(entry.id.to_string())
    .bind(entry.project_id.to_string())
    .bind(entry.activity_type.as_str())
    .bind(&entry.description)
    .bind(&entry.actor)
    .bind(entry.created_at.to_rfc3339())
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepository {
    async fn list_for_project(&self, project_id: Uuid) -> DomainResult<Vec<ActivityLogEntry>> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            "SELECT * FROM activity_log WHERE project_id = ? ORDER BY rowid"
        )
        .bind(project_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: String,
    project_id: String,
    activity_type: String,
    description: String,
    actor: Option<String>,
    created_at: String,
}

impl TryFrom<ActivityRow> for ActivityLogEntry {
    type Error = DomainError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let activity_type = ActivityType::from_str(&row.activity_type).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid activity type: {}", row.activity_type))
        })?;

        Ok(ActivityLogEntry {
            id: parse_uuid(&row.id)?,
            project_id: parse_uuid(&row.project_id)?,
            activity_type,
            description: row.description,
            created_at: parse_datetime(&row.created_at)?,
            actor: row.actor,
        })
    }
}
