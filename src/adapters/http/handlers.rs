use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::types::{
    DealResultRequest, DescriptorResponse, ErrorResponse, ProjectEnvelope, ProjectOnly,
    ProjectResponse, StatusRequest, StatusResponse, ToggleRequest, TroubleRequest,
};
use super::AppState;
use crate::domain::errors::DomainError;
use crate::domain::ports::{ActivityRepository, ProjectRepository};
use crate::services::TransitionOutcome;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto a status code and body.
pub fn error_response(err: DomainError) -> ApiError {
    let status = match &err {
        DomainError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::PreconditionFailed { .. } | DomainError::ConcurrencyConflict { .. } => {
            StatusCode::CONFLICT
        }
        DomainError::DatabaseError(_) | DomainError::SerializationError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = match err {
        DomainError::ProjectNotFound(_) => ErrorResponse::new(err.to_string(), "NOT_FOUND"),
        DomainError::ValidationFailed { ref fields } => ErrorResponse {
            fields: Some(fields.clone()),
            ..ErrorResponse::new(err.to_string(), "VALIDATION_FAILED")
        },
        DomainError::PreconditionFailed { blocking_date } => ErrorResponse {
            blocking_date: Some(blocking_date),
            ..ErrorResponse::new(err.to_string(), "PRECONDITION_FAILED")
        },
        DomainError::ConcurrencyConflict { .. } => {
            ErrorResponse::new(err.to_string(), "CONCURRENCY_CONFLICT")
        }
        DomainError::DatabaseError(_) | DomainError::SerializationError(_) => {
            tracing::error!(error = %err, "storage failure");
            ErrorResponse::new("Internal storage error", "STORAGE_ERROR")
        }
    };

    (status, Json(body))
}

/// Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}

/// `POST /api/v1/projects/{id}/status`: advance or revert one stage.
pub async fn change_status<P: ProjectRepository + 'static, A: ActivityRepository + 'static>(
    State(state): State<Arc<AppState<P, A>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let outcome = state
        .workflow
        .transitions
        .submit(id, req.into())
        .await
        .map_err(error_response)?;

    let response = match outcome {
        TransitionOutcome::Applied(project) => StatusResponse::Project(ProjectEnvelope {
            message: format!("Project moved to {}", project.stage.label()),
            project: ProjectResponse::from(project),
        }),
        TransitionOutcome::Unchanged { project, message } => {
            StatusResponse::Project(ProjectEnvelope {
                message,
                project: ProjectResponse::from(project),
            })
        }
        TransitionOutcome::NeedsInput(descriptor)
        | TransitionOutcome::NeedsConfirmation(descriptor) => {
            StatusResponse::Descriptor(DescriptorResponse::from(descriptor))
        }
    };
    Ok(Json(response))
}

/// `POST /api/v1/projects/{id}/deal-result/toggle`
pub async fn toggle_deal_result<P: ProjectRepository + 'static, A: ActivityRepository + 'static>(
    State(state): State<Arc<AppState<P, A>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ProjectOnly>, ApiError> {
    let project = state
        .workflow
        .flags
        .toggle(id, req.action, req.actor)
        .await
        .map_err(error_response)?;
    Ok(Json(ProjectOnly {
        project: project.into(),
    }))
}

/// `POST /api/v1/projects/{id}/deal-result`: force lost, hold or neither.
pub async fn set_deal_result<P: ProjectRepository + 'static, A: ActivityRepository + 'static>(
    State(state): State<Arc<AppState<P, A>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<DealResultRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state
        .workflow
        .flags
        .apply_deal_action(id, req.action, req.actor)
        .await
        .map_err(error_response)?;
    Ok(Json(project.into()))
}

/// `POST /api/v1/projects/{id}/trouble`
pub async fn set_trouble<P: ProjectRepository + 'static, A: ActivityRepository + 'static>(
    State(state): State<Arc<AppState<P, A>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TroubleRequest>,
) -> Result<Json<ProjectEnvelope>, ApiError> {
    let update = state
        .workflow
        .flags
        .set_trouble(id, req.trouble_flag, req.actor)
        .await
        .map_err(error_response)?;
    Ok(Json(ProjectEnvelope {
        message: update.message,
        project: update.project.into(),
    }))
}
