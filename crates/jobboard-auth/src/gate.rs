//! Per-endpoint role enforcement.
//!
//! An absent identity is reported as [`AuthError::MissingCredential`] (401);
//! a present identity with the wrong role as [`AuthError::Forbidden`] (403).

use jobboard_models::{Role, VerifiedIdentity};

use crate::error::{AuthError, AuthResult};

/// Allow the request only if `identity` has exactly `required`.
pub fn authorize(
    identity: Option<&VerifiedIdentity>,
    required: Role,
) -> AuthResult<VerifiedIdentity> {
    authorize_any(identity, &[required])
}

/// Allow the request if `identity` has one of the `accepted` roles.
pub fn authorize_any(
    identity: Option<&VerifiedIdentity>,
    accepted: &[Role],
) -> AuthResult<VerifiedIdentity> {
    let identity = identity.ok_or(AuthError::MissingCredential)?;
    if accepted.contains(&identity.role) {
        Ok(*identity)
    } else {
        Err(AuthError::Forbidden)
    }
}
