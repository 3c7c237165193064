//! End-to-end workflow tests against an in-memory SQLite store.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;

use fieldflow::adapters::sqlite::{
    create_migrated_test_pool, SqliteActivityRepository, SqliteProjectRepository,
};
use fieldflow::domain::models::{ActivityType, InstallationInfo, ProjectRecord, Stage, TransitionData};
use fieldflow::domain::ports::{Clock, FixedClock, ProjectRepository, TracingNotifier};
use fieldflow::services::{DealAction, ToggleAction, TransitionOutcome, TransitionRequest, WorkflowService};
use fieldflow::DomainError;

type Workflow = WorkflowService<SqliteProjectRepository, SqliteActivityRepository>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct TestContext {
    workflow: Workflow,
    projects: Arc<SqliteProjectRepository>,
    clock: Arc<FixedClock>,
    pool: SqlitePool,
}

impl TestContext {
    async fn new(today: NaiveDate) -> Self {
        let pool = create_migrated_test_pool().await.unwrap();
        let projects = Arc::new(SqliteProjectRepository::new(pool.clone()));
        let clock = Arc::new(FixedClock::on(today));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let workflow = WorkflowService::new(
            projects.clone(),
            Arc::new(SqliteActivityRepository::new(pool.clone())),
            dyn_clock,
            Arc::new(TracingNotifier),
            "trouble_desk",
        );
        Self {
            workflow,
            projects,
            clock,
            pool,
        }
    }

    async fn break_activity_log(&self) {
        sqlx::query(
            "CREATE TRIGGER reject_log BEFORE INSERT ON activity_log \
             BEGIN SELECT RAISE(ABORT, 'activity log unavailable'); END",
        )
        .execute(&self.pool)
        .await
        .unwrap();
    }

    async fn seed(&self, project: ProjectRecord) -> ProjectRecord {
        self.projects.create(&project).await.unwrap();
        project
    }

    async fn reload(&self, project: &ProjectRecord) -> ProjectRecord {
        self.projects.get(project.id).await.unwrap().unwrap()
    }

    async fn log_len(&self, project: &ProjectRecord) -> usize {
        self.workflow.activity.history(project.id).await.unwrap().len()
    }
}

#[tokio::test]
async fn test_installation_completion_scenario() {
    let ctx = TestContext::new(date(2024, 1, 9)).await;
    let project = ctx
        .seed(
            ProjectRecord::new("Harbour warehouse", "alice")
                .with_stage(Stage::InstallationArranged)
                .with_installation_date(date(2024, 1, 10)),
        )
        .await;

    let err = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::PreconditionFailed { blocking_date } if blocking_date == date(2024, 1, 10)
    ));
    assert!(err.to_string().contains("2024-01-10"));

    ctx.clock.set_date(date(2024, 1, 10));
    let outcome = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next())
        .await
        .unwrap();
    match outcome {
        TransitionOutcome::NeedsConfirmation(descriptor) => {
            assert!(descriptor.message.contains("2024-01-10"));
        }
        other => panic!("expected a confirmation descriptor, got {other:?}"),
    }
    assert_eq!(ctx.log_len(&project).await, 0);

    let outcome = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next().confirmed())
        .await
        .unwrap();
    assert!(outcome.is_applied());
    assert_eq!(ctx.reload(&project).await.stage, Stage::InstallationComplete);

    let history = ctx.workflow.activity.history(project.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].activity_type, ActivityType::StatusUpdate);
    assert!(history[0].description.contains("Installation arranged"));
    assert!(history[0].description.contains("Installation complete"));
}

#[tokio::test]
async fn test_completion_checks_the_date_sent_with_the_request() {
    let ctx = TestContext::new(date(2024, 1, 10)).await;
    let project = ctx
        .seed(
            ProjectRecord::new("Harbour warehouse", "alice")
                .with_stage(Stage::InstallationArranged)
                .with_installation_date(date(2024, 1, 10)),
        )
        .await;

    let postponed = TransitionData::default()
        .with_installation(InstallationInfo::new("Late Co", date(2024, 6, 1)));
    let err = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next().confirmed().with_data(postponed))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::PreconditionFailed { blocking_date } if blocking_date == date(2024, 6, 1)
    ));
    let stored = ctx.reload(&project).await;
    assert_eq!(stored.stage, Stage::InstallationArranged);
    assert_eq!(stored.installation_date, Some(date(2024, 1, 10)));
    assert_eq!(ctx.log_len(&project).await, 0);
}

#[tokio::test]
async fn test_failed_log_write_changes_nothing_and_retry_is_safe() {
    let ctx = TestContext::new(date(2024, 1, 1)).await;
    let project = ctx.seed(ProjectRecord::new("Quayside", "bob")).await;
    ctx.break_activity_log().await;

    let err = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DatabaseError(_)));

    let err = ctx
        .workflow
        .flags
        .set_trouble(project.id, true, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DatabaseError(_)));

    let stored = ctx.reload(&project).await;
    assert_eq!(stored.stage, Stage::InTalks);
    assert_eq!(stored.assignee, "bob");
    assert!(!stored.trouble_flag());
    assert_eq!(ctx.log_len(&project).await, 0);

    sqlx::query("DROP TRIGGER reject_log")
        .execute(&ctx.pool)
        .await
        .unwrap();
    let outcome = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next())
        .await
        .unwrap();
    assert!(outcome.is_applied());
    assert_eq!(ctx.reload(&project).await.stage, Stage::Ordered);
    assert_eq!(ctx.log_len(&project).await, 1);
}

#[tokio::test]
async fn test_full_lifecycle_forward_and_back() {
    let ctx = TestContext::new(date(2024, 3, 1)).await;
    let project = ctx.seed(ProjectRecord::new("Museum annex", "alice")).await;
    let transitions = &ctx.workflow.transitions;

    let project_id = project.id;
    let submit = move |request: TransitionRequest| transitions.submit(project_id, request);

    assert!(submit(TransitionRequest::next().with_data(
        TransitionData::default().with_delivery_date(date(2024, 2, 20))
    ))
    .await
    .unwrap()
    .is_applied());

    assert!(submit(TransitionRequest::next().confirmed()).await.unwrap().is_applied());

    let installation = TransitionData::default()
        .with_installation(InstallationInfo::new("Acme Fitters", date(2024, 2, 28)))
        .with_estimated_amount(90_000);
    assert!(submit(TransitionRequest::next().with_data(installation))
        .await
        .unwrap()
        .is_applied());

    assert!(submit(TransitionRequest::next().confirmed()).await.unwrap().is_applied());
    assert!(submit(
        TransitionRequest::next()
            .confirmed()
            .with_data(TransitionData::default().with_revenue(120_000))
    )
    .await
    .unwrap()
    .is_applied());

    let done = ctx.reload(&project).await;
    assert_eq!(done.stage, Stage::FinalBillingIssued);
    assert_eq!(done.delivery_date, Some(date(2024, 2, 20)));
    assert_eq!(done.installation_contractor.as_deref(), Some("Acme Fitters"));
    assert_eq!(done.estimated_amount, Some(90_000));
    assert_eq!(done.revenue, Some(120_000));
    assert_eq!(ctx.log_len(&project).await, 5);

    let outcome = submit(TransitionRequest::next().confirmed()).await.unwrap();
    assert!(matches!(outcome, TransitionOutcome::Unchanged { .. }));
    assert_eq!(ctx.log_len(&project).await, 5);

    for expected in Stage::ALL.iter().rev().skip(1) {
        let outcome = submit(TransitionRequest::previous()).await.unwrap();
        match outcome {
            TransitionOutcome::Applied(record) => assert_eq!(record.stage, *expected),
            other => panic!("expected revert to apply, got {other:?}"),
        }
    }
    let outcome = submit(TransitionRequest::previous()).await.unwrap();
    assert!(matches!(outcome, TransitionOutcome::Unchanged { .. }));
    assert_eq!(ctx.log_len(&project).await, 10);

    let reverted = ctx.reload(&project).await;
    assert_eq!(reverted.stage, Stage::InTalks);
    assert_eq!(reverted.revenue, Some(120_000));
}

#[tokio::test]
async fn test_blank_contractor_is_rejected_naming_the_field() {
    let ctx = TestContext::new(date(2024, 1, 1)).await;
    let project = ctx
        .seed(ProjectRecord::new("Depot", "alice").with_stage(Stage::InternationalOrderPlaced))
        .await;

    let data = TransitionData::default().with_installation(InstallationInfo {
        contractor: Some(String::new()),
        date: Some(date(2024, 1, 10)),
    });
    let err = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next().confirmed().with_data(data))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::ValidationFailed { .. }));
    assert!(err.to_string().contains("installation_contractor"));
    assert_eq!(ctx.reload(&project).await.stage, Stage::InternationalOrderPlaced);
    assert_eq!(ctx.log_len(&project).await, 0);
}

#[tokio::test]
async fn test_flags_keep_invariants_and_log_each_change() {
    let ctx = TestContext::new(date(2024, 1, 1)).await;
    let project = ctx.seed(ProjectRecord::new("Arena", "bob")).await;
    let flags = &ctx.workflow.flags;

    flags
        .apply_deal_action(project.id, DealAction::Hold, None)
        .await
        .unwrap();
    let toggled = flags
        .toggle(project.id, ToggleAction::ToggleLost, Some("carol".into()))
        .await
        .unwrap();
    assert!(toggled.lost_flag());
    assert!(!toggled.hold_flag());

    let troubled = flags.set_trouble(project.id, true, None).await.unwrap();
    assert_eq!(troubled.project.assignee, "trouble_desk");
    assert!(troubled.project.lost_flag());

    let restored = flags.set_trouble(project.id, false, None).await.unwrap();
    assert_eq!(restored.project.assignee, "bob");
    assert!(restored.project.backup_assignee().is_none());

    let history = ctx.workflow.activity.history(project.id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(history.iter().all(|e| e.activity_type == ActivityType::FlagUpdate));
    assert!(history[1].description.contains("lost=false, hold=true"));
    assert!(history[1].description.contains("lost=true, hold=false"));
    assert_eq!(history[1].actor.as_deref(), Some("carol"));
}

#[tokio::test]
async fn test_deleting_project_removes_its_log() {
    let ctx = TestContext::new(date(2024, 1, 1)).await;
    let project = ctx.seed(ProjectRecord::new("Pier", "bob")).await;
    ctx.workflow
        .transitions
        .submit(project.id, TransitionRequest::next())
        .await
        .unwrap();
    assert_eq!(ctx.log_len(&project).await, 1);

    ctx.projects.delete(project.id).await.unwrap();

    assert_eq!(ctx.log_len(&project).await, 0);
    let err = ctx
        .workflow
        .transitions
        .submit(project.id, TransitionRequest::next())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ProjectNotFound(_)));
}
