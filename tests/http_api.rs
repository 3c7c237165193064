//! HTTP API tests driving the router in-process.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use fieldflow::adapters::http::build_router;
use fieldflow::adapters::sqlite::{
    create_migrated_test_pool, SqliteActivityRepository, SqliteProjectRepository,
};
use fieldflow::domain::models::{ProjectRecord, Stage};
use fieldflow::domain::ports::{Clock, FixedClock, ProjectRepository, TracingNotifier};
use fieldflow::services::WorkflowService;

struct TestApp {
    router: Router,
    projects: Arc<SqliteProjectRepository>,
}

async fn test_app() -> TestApp {
    let pool = create_migrated_test_pool().await.unwrap();
    let projects = Arc::new(SqliteProjectRepository::new(pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()));
    let workflow = WorkflowService::new(
        projects.clone(),
        Arc::new(SqliteActivityRepository::new(pool)),
        clock,
        Arc::new(TracingNotifier),
        "trouble_desk",
    );
    TestApp {
        router: build_router(workflow, false),
        projects,
    }
}

async fn body_json<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: String, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn seed(app: &TestApp, project: ProjectRecord) -> Uuid {
    app.projects.create(&project).await.unwrap();
    project.id
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_descriptor_then_confirm() {
    let app = test_app().await;
    let id = seed(
        &app,
        ProjectRecord::new("Gallery", "alice")
            .with_stage(Stage::Ordered)
            .with_delivery_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
    )
    .await;

    let response = app
        .router
        .clone()
        .oneshot(post(format!("/api/v1/projects/{id}/status"), json!({ "action": "next" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["requiresConfirmation"], true);
    assert!(body["message"].as_str().unwrap().contains("2024-02-01"));
    assert_eq!(body["currentValues"]["deliveryDate"], "2024-02-01");
    assert!(body.get("project").is_none());

    let response = app
        .router
        .oneshot(post(
            format!("/api/v1/projects/{id}/status"),
            json!({ "action": "next", "confirm": true, "actor": "alice" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["project"]["stage"], "international_order_placed");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_status_requires_installation_info() {
    let app = test_app().await;
    let id = seed(
        &app,
        ProjectRecord::new("Gallery", "alice").with_stage(Stage::InternationalOrderPlaced),
    )
    .await;

    let response = app
        .router
        .clone()
        .oneshot(post(format!("/api/v1/projects/{id}/status"), json!({ "action": "next" })))
        .await
        .unwrap();
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["requiresInstallationInfo"], true);

    let response = app
        .router
        .clone()
        .oneshot(post(
            format!("/api/v1/projects/{id}/status"),
            json!({
                "action": "next",
                "installationData": { "contractor": "", "date": "2024-01-10" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["fields"], json!(["installation_contractor"]));

    let response = app
        .router
        .oneshot(post(
            format!("/api/v1/projects/{id}/status"),
            json!({
                "action": "next",
                "installationData": { "contractor": "Acme Fitters", "date": "2024-01-10" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["project"]["stage"], "installation_arranged");
    assert_eq!(body["project"]["installationContractor"], "Acme Fitters");
}

#[tokio::test]
async fn test_completion_before_date_is_conflict() {
    let app = test_app().await;
    let id = seed(
        &app,
        ProjectRecord::new("Gallery", "alice")
            .with_stage(Stage::InstallationArranged)
            .with_installation_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
    )
    .await;

    let response = app
        .router
        .oneshot(post(
            format!("/api/v1/projects/{id}/status"),
            json!({ "action": "next", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["code"], "PRECONDITION_FAILED");
    assert_eq!(body["blockingDate"], "2024-01-10");
}

#[tokio::test]
async fn test_toggle_lost_on_held_project() {
    let app = test_app().await;
    let id = seed(&app, ProjectRecord::new("Gallery", "alice")).await;

    let response = app
        .router
        .clone()
        .oneshot(post(
            format!("/api/v1/projects/{id}/deal-result"),
            json!({ "action": "hold" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["holdFlag"], true);

    let response = app
        .router
        .oneshot(post(
            format!("/api/v1/projects/{id}/deal-result/toggle"),
            json!({ "action": "toggleLost" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["project"]["lostFlag"], true);
    assert_eq!(body["project"]["holdFlag"], false);
}

#[tokio::test]
async fn test_trouble_flag_round_trip() {
    let app = test_app().await;
    let id = seed(&app, ProjectRecord::new("Gallery", "alice")).await;

    let response = app
        .router
        .clone()
        .oneshot(post(
            format!("/api/v1/projects/{id}/trouble"),
            json!({ "trouble_flag": true }),
        ))
        .await
        .unwrap();
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["project"]["troubleFlag"], true);
    assert_eq!(body["project"]["assignee"], "trouble_desk");
    assert_eq!(body["project"]["backupAssignee"], "alice");
    assert!(body["message"].is_string());

    let response = app
        .router
        .oneshot(post(
            format!("/api/v1/projects/{id}/trouble"),
            json!({ "trouble_flag": false }),
        ))
        .await
        .unwrap();
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["project"]["troubleFlag"], false);
    assert_eq!(body["project"]["assignee"], "alice");
    assert!(body["project"]["backupAssignee"].is_null());
}

#[tokio::test]
async fn test_unknown_project_is_not_found() {
    let app = test_app().await;
    let id = Uuid::new_v4();

    let response = app
        .router
        .oneshot(post(
            format!("/api/v1/projects/{id}/deal-result"),
            json!({ "action": "lost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(response.into_body()).await;
    assert_eq!(body["code"], "NOT_FOUND");
}
