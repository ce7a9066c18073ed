//! Admin handlers for user and content management.
//!
//! Mounted behind `require_auth` + `require_admin`, so every handler here
//! already runs as an admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use jobboard_models::{JobId, UserId, UserProfile};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::StoreStats;

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserProfile>,
    pub total: usize,
}

/// List every account.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users: Vec<UserProfile> = state
        .store
        .list_users()
        .await?
        .iter()
        .map(|u| u.profile())
        .collect();

    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}

/// Delete an account and everything it owns.
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(user_id): Path<UserId>,
) -> ApiResult<StatusCode> {
    if admin.id == user_id {
        return Err(ApiError::bad_request("Admins cannot delete their own account"));
    }

    if !state.store.delete_user(user_id).await? {
        return Err(ApiError::not_found(format!("User {} not found", user_id)));
    }

    info!(admin_id = admin.id, user_id, "Admin deleted user");
    Ok(StatusCode::NO_CONTENT)
}

/// Remove any job posting.
pub async fn delete_job(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(job_id): Path<JobId>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_job(job_id).await? {
        return Err(ApiError::not_found(format!("Job {} not found", job_id)));
    }

    info!(admin_id = admin.id, job_id, "Admin deleted job");
    Ok(StatusCode::NO_CONTENT)
}

/// Dashboard counts.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StoreStats>> {
    Ok(Json(state.store.stats().await?))
}
