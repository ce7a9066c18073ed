//! Bearer token authentication for Axum.
//!
//! Two adapters over [`jobboard_auth::authenticate`]:
//! - [`require_auth`]: middleware that runs the inner service only for an
//!   authenticated request, stashing the identity in request extensions.
//! - [`AuthUser`] / [`MaybeAuthUser`]: extractors for inline checks inside
//!   handlers.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use jobboard_auth::{authenticate, authorize, identify};
use jobboard_models::{Role, UserId, VerifiedIdentity};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: UserId,
    pub role: Role,
}

impl AuthUser {
    pub fn identity(&self) -> VerifiedIdentity {
        VerifiedIdentity::new(self.id, self.role)
    }

    /// Reject unless the caller has exactly `role`.
    pub fn require(&self, role: Role) -> ApiResult<()> {
        authorize(Some(&self.identity()), role)?;
        Ok(())
    }
}

impl From<VerifiedIdentity> for AuthUser {
    fn from(identity: VerifiedIdentity) -> Self {
        Self {
            id: identity.id,
            role: identity.role,
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by `require_auth`
        if let Some(identity) = parts.extensions.get::<VerifiedIdentity>() {
            return Ok(AuthUser::from(*identity));
        }

        let identity = authenticate(&parts.headers, &state.codec)?;
        Ok(AuthUser::from(identity))
    }
}

/// Caller identity if a valid bearer token is present, otherwise `None`.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<VerifiedIdentity>()
            .copied()
            .or_else(|| identify(&parts.headers, &state.codec));
        Ok(MaybeAuthUser(identity.map(AuthUser::from)))
    }
}

/// Middleware: continue only for requests carrying a valid bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state.codec) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            debug!(path = %request.uri().path(), code = e.code(), "Rejected unauthenticated request");
            ApiError::from(e).into_response()
        }
    }
}

/// Middleware: continue only for admins. Must run inside [`require_auth`].
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let identity = request.extensions().get::<VerifiedIdentity>().copied();
    match authorize(identity.as_ref(), Role::Admin) {
        Ok(_) => next.run(request).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}
