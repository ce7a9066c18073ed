//! Job posting handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use jobboard_models::{Application, CreateJobRequest, Job, JobFilter, JobId, Role};

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
}

/// List jobs (public).
pub async fn list_jobs(
    State(state): State<AppState>,
    filter: Result<Query<JobFilter>, QueryRejection>,
) -> ApiResult<Json<JobListResponse>> {
    let Query(filter) = filter?;
    let jobs = state.store.list_jobs(&filter).await?;
    Ok(Json(JobListResponse {
        total: jobs.len(),
        jobs,
    }))
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: Job,
    /// Only present when the caller is a signed-in student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_applied: Option<bool>,
}

/// Get a single job (public; students also see whether they applied).
pub async fn get_job(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(job_id): Path<JobId>,
) -> ApiResult<Json<JobDetailResponse>> {
    let job = load_job(&state, job_id).await?;

    let has_applied = match user {
        Some(user) if user.role == Role::Student => Some(
            state
                .store
                .list_applications_for_student(user.id)
                .await?
                .iter()
                .any(|a| a.job_id == job_id),
        ),
        _ => None,
    };

    Ok(Json(JobDetailResponse { job, has_applied }))
}

/// Post a job (college only).
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    user.require(Role::College)?;
    let Json(request) = body?;
    request.validate()?;

    let job = state.store.create_job(user.id, request).await?;
    info!(job_id = job.id, posted_by = user.id, "Job posted");

    Ok((StatusCode::CREATED, Json(job)))
}

/// Delete a job (posting college only).
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<JobId>,
) -> ApiResult<StatusCode> {
    user.require(Role::College)?;
    let job = load_job(&state, job_id).await?;
    ensure_owner(&job, &user)?;

    state.store.delete_job(job_id).await?;
    info!(job_id, deleted_by = user.id, "Job deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Applications received for a job (posting college only).
pub async fn list_job_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<JobId>,
) -> ApiResult<Json<Vec<Application>>> {
    user.require(Role::College)?;
    let job = load_job(&state, job_id).await?;
    ensure_owner(&job, &user)?;

    let applications = state.store.list_applications_for_job(job_id).await?;
    Ok(Json(applications))
}

pub(crate) async fn load_job(state: &AppState, job_id: JobId) -> ApiResult<Job> {
    state
        .store
        .get_job(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", job_id)))
}

pub(crate) fn ensure_owner(job: &Job, user: &AuthUser) -> ApiResult<()> {
    if job.posted_by != user.id {
        return Err(ApiError::forbidden("Only the posting account can manage this job"));
    }
    Ok(())
}
