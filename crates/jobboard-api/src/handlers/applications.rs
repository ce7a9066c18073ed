//! Application handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use validator::Validate;

use jobboard_models::{
    Application, ApplicationId, ApplyRequest, JobId, Role, UpdateApplicationStatusRequest,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::{ensure_owner, load_job};
use crate::state::AppState;

/// Apply to a job (student only). One application per job.
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<JobId>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    user.require(Role::Student)?;
    // The body is optional, but a JSON body that doesn't parse is still an error
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => ApplyRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    request.validate()?;

    let application = state
        .store
        .create_application(job_id, user.id, request.cover_letter)
        .await?;
    info!(application_id = application.id, job_id, student_id = user.id, "Application submitted");

    Ok((StatusCode::CREATED, Json(application)))
}

/// The caller's own applications (student only).
pub async fn list_my_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Application>>> {
    user.require(Role::Student)?;
    let applications = state.store.list_applications_for_student(user.id).await?;
    Ok(Json(applications))
}

/// Move an application through review (college owning the job only).
pub async fn update_application_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<ApplicationId>,
    body: Result<Json<UpdateApplicationStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Application>> {
    user.require(Role::College)?;
    let Json(request) = body?;

    let application = state
        .store
        .get_application(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Application {} not found", application_id)))?;
    let job = load_job(&state, application.job_id).await?;
    ensure_owner(&job, &user)?;

    let updated = state
        .store
        .update_application_status(application_id, request.status)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Application {} not found", application_id)))?;

    info!(application_id, status = ?updated.status, "Application status updated");
    Ok(Json(updated))
}
