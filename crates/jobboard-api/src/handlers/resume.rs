//! Resume builder handlers (student only).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use validator::Validate;

use jobboard_models::{Resume, ResumeUpdate, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn get_resume(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Resume>> {
    user.require(Role::Student)?;
    let resume = state
        .store
        .get_resume(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("No resume yet"))?;
    Ok(Json(resume))
}

/// Replace the caller's resume.
pub async fn put_resume(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<ResumeUpdate>, JsonRejection>,
) -> ApiResult<Json<Resume>> {
    user.require(Role::Student)?;
    let Json(update) = body?;
    update.validate()?;

    let resume = state.store.upsert_resume(update.into_resume(user.id)).await?;
    Ok(Json(resume))
}
