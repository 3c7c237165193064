//! SQLite implementation of the ProjectRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::activity_repository::insert_entry;
use super::{format_date, parse_datetime, parse_optional_date, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityLogEntry, DealResult, ProjectRecord, Stage, TroubleContext};
use crate::domain::ports::ProjectRepository;

/// SQLite-backed project store.
#[derive(Clone)]
pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Error for an update that matched no row.
    async fn stale_or_missing(&self, id: Uuid) -> DomainResult<DomainError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM projects WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some(_) => DomainError::ConcurrencyConflict {
                entity: "project".to_string(),
                id: id.to_string(),
            },
            None => DomainError::ProjectNotFound(id),
        })
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn create(&self, project: &ProjectRecord) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO projects (id, name, stage, lost_flag, hold_flag, trouble_flag,
               assignee, backup_assignee, installation_contractor, installation_date,
               revenue, delivery_date, estimated_amount, version, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(project.stage.as_str())
        .bind(project.lost_flag())
        .bind(project.hold_flag())
        .bind(project.trouble_flag())
        .bind(&project.assignee)
        .bind(project.backup_assignee())
        .bind(&project.installation_contractor)
        .bind(project.installation_date.map(format_date))
        .bind(project.revenue)
        .bind(project.delivery_date.map(format_date))
        .bind(project.estimated_amount)
        .bind(project.version as i64)
        .bind(project.created_at.to_rfc3339())
        .bind(project.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<ProjectRecord>> {
        let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update_with_activity(
        &self,
        project: &ProjectRecord,
        entry: &ActivityLogEntry,
    ) -> DomainResult<u64> {
        // Dropping `tx` on any early return rolls both writes back.
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE projects SET name = ?, stage = ?, lost_flag = ?, hold_flag = ?,
               trouble_flag = ?, assignee = ?, backup_assignee = ?,
               installation_contractor = ?, installation_date = ?, revenue = ?,
               delivery_date = ?, estimated_amount = ?, updated_at = ?,
               version = version + 1
               WHERE id = ? AND version = ?"#
        )
        .bind(&project.name)
        .bind(project.stage.as_str())
        .bind(project.lost_flag())
        .bind(project.hold_flag())
        .bind(project.trouble_flag())
        .bind(&project.assignee)
        .bind(project.backup_assignee())
        .bind(&project.installation_contractor)
        .bind(project.installation_date.map(format_date))
        .bind(project.revenue)
        .bind(project.delivery_date.map(format_date))
        .bind(project.estimated_amount)
        .bind(project.updated_at.to_rfc3339())
        .bind(project.id.to_string())
        .bind(project.version as i64)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(self.stale_or_missing(project.id).await?);
        }

        insert_entry(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(project.version + 1)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProjectNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    stage: String,
    lost_flag: bool,
    hold_flag: bool,
    trouble_flag: bool,
    assignee: String,
    backup_assignee: Option<String>,
    installation_contractor: Option<String>,
    installation_date: Option<String>,
    revenue: Option<i64>,
    delivery_date: Option<String>,
    estimated_amount: Option<i64>,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = DomainError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let stage = Stage::from_str(&row.stage)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid stage: {}", row.stage)))?;

        let deal_result = DealResult::from_flags(row.lost_flag, row.hold_flag).ok_or_else(|| {
            DomainError::SerializationError(format!("Project {} has both lost and hold set", row.id))
        })?;

        let trouble = row.trouble_flag.then(|| TroubleContext {
            backup_assignee: row.backup_assignee,
        });

        Ok(ProjectRecord {
            id: parse_uuid(&row.id)?,
            name: row.name,
            stage,
            deal_result,
            trouble,
            assignee: row.assignee,
            installation_contractor: row.installation_contractor,
            installation_date: parse_optional_date(row.installation_date)?,
            revenue: row.revenue,
            delivery_date: parse_optional_date(row.delivery_date)?,
            estimated_amount: row.estimated_amount,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
            version: row.version as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteActivityRepository};
    use crate::domain::models::ActivityType;
    use crate::domain::ports::ActivityRepository;
    use chrono::{NaiveDate, Utc};

    async fn setup_test_repo() -> SqliteProjectRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteProjectRepository::new(pool)
    }

    fn entry_for(project: &ProjectRecord, description: &str) -> ActivityLogEntry {
        ActivityLogEntry::new(project.id, ActivityType::FlagUpdate, description, Utc::now())
    }

    #[tokio::test]
    async fn test_create_and_get_project() {
        let repo = setup_test_repo().await;
        let project = ProjectRecord::new("Showroom", "alice")
            .with_stage(Stage::InstallationArranged)
            .with_installation_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());

        repo.create(&project).await.unwrap();

        let retrieved = repo.get(project.id).await.unwrap().unwrap();
        assert_eq!(retrieved.name, "Showroom");
        assert_eq!(retrieved.stage, Stage::InstallationArranged);
        assert_eq!(retrieved.installation_date, project.installation_date);
        assert_eq!(retrieved.deal_result, DealResult::Active);
        assert!(retrieved.trouble.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_project() {
        let repo = setup_test_repo().await;
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_logs() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteProjectRepository::new(pool.clone());
        let activity = SqliteActivityRepository::new(pool);
        let mut project = ProjectRecord::new("Showroom", "alice");
        repo.create(&project).await.unwrap();

        project.raise_trouble("trouble_desk", Utc::now());
        let version = repo
            .update_with_activity(&project, &entry_for(&project, "trouble raised"))
            .await
            .unwrap();
        assert_eq!(version, 2);

        let retrieved = repo.get(project.id).await.unwrap().unwrap();
        assert_eq!(retrieved.version, 2);
        assert_eq!(retrieved.assignee, "trouble_desk");
        assert_eq!(retrieved.backup_assignee(), Some("alice"));

        let log = activity.list_for_project(project.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].description, "trouble raised");
    }

    #[tokio::test]
    async fn test_failed_log_insert_rolls_back_update() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteProjectRepository::new(pool.clone());
        let activity = SqliteActivityRepository::new(pool.clone());
        let mut project = ProjectRecord::new("Showroom", "alice");
        repo.create(&project).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_log BEFORE INSERT ON activity_log \
             BEGIN SELECT RAISE(ABORT, 'activity log unavailable'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        project.set_deal_result(DealResult::Lost, Utc::now());
        let err = repo
            .update_with_activity(&project, &entry_for(&project, "lost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));

        let stored = repo.get(project.id).await.unwrap().unwrap();
        assert_eq!(stored.deal_result, DealResult::Active);
        assert_eq!(stored.version, 1);
        assert!(activity.list_for_project(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_update_is_a_conflict() {
        let repo = setup_test_repo().await;
        let project = ProjectRecord::new("Showroom", "alice");
        repo.create(&project).await.unwrap();

        let mut first = project.clone();
        first.set_deal_result(DealResult::Lost, Utc::now());
        repo.update_with_activity(&first, &entry_for(&first, "lost"))
            .await
            .unwrap();

        let mut second = project.clone();
        second.set_deal_result(DealResult::Hold, Utc::now());
        let err = repo
            .update_with_activity(&second, &entry_for(&second, "hold"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

        let stored = repo.get(project.id).await.unwrap().unwrap();
        assert_eq!(stored.deal_result, DealResult::Lost);
    }

    #[tokio::test]
    async fn test_update_missing_project() {
        let repo = setup_test_repo().await;
        let project = ProjectRecord::new("Ghost", "alice");
        let err = repo
            .update_with_activity(&project, &entry_for(&project, "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProjectNotFound(id) if id == project.id));
    }

    #[tokio::test]
    async fn test_delete_project() {
        let repo = setup_test_repo().await;
        let project = ProjectRecord::new("Showroom", "alice");
        repo.create(&project).await.unwrap();

        repo.delete(project.id).await.unwrap();
        assert!(repo.get(project.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(project.id).await,
            Err(DomainError::ProjectNotFound(_))
        ));
    }
}
