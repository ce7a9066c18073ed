//! Signup, login and current-account handlers.
//!
//! These are the only places tokens are issued.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};
use validator::Validate;

use jobboard_auth::{hash_password, verify_password};
use jobboard_models::{
    normalize_email, AuthResponse, LoginRequest, NewUser, SignupRequest, User, UserProfile,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

fn issue_for(state: &AppState, user: &User, flow: &str) -> ApiResult<AuthResponse> {
    let token = state.codec.issue_identity(&user.identity())?;
    metrics::record_token_issued(flow);
    Ok(AuthResponse {
        token,
        user: user.profile(),
    })
}

/// Create an account and return a token for it.
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = body?;
    request.validate()?;

    if !request.role.is_self_assignable() {
        return Err(ApiError::bad_request(format!(
            "Role '{}' cannot be chosen at signup",
            request.role
        )));
    }

    let password_hash = hash_password(&request.password)?;
    let user = state
        .store
        .create_user(NewUser {
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            role: request.role,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, role = %user.role, "User signed up");

    let response = issue_for(&state, &user, "signup")?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange email and password for a token.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = body?;
    request.validate()?;

    let email = normalize_email(&request.email);
    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    if !verify_password(&request.password, &user.password_hash)? {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    info!(user_id = user.id, "User logged in");
    Ok(Json(issue_for(&state, &user, "login")?))
}

/// Current account profile.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<UserProfile>> {
    let record = state
        .store
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account no longer exists"))?;
    Ok(Json(record.profile()))
}
