//! Authentication error types.

use thiserror::Error;

/// Result type for request authentication and gating.
pub type AuthResult<T> = Result<T, AuthError>;

/// Request-level authentication and authorization failures.
///
/// These are the only outcomes callers outside this crate see. Token
/// internals are folded into [`AuthError::InvalidCredential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header, or not of the form `Bearer <token>`.
    #[error("Missing or malformed bearer credential")]
    MissingCredential,

    /// A bearer token was presented but failed verification.
    #[error("Invalid or expired credential")]
    InvalidCredential,

    /// Identity is valid but its role is not accepted by the endpoint.
    #[error("Insufficient role for this resource")]
    Forbidden,
}

impl AuthError {
    /// Stable machine-readable code for error bodies and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidCredential => "invalid_credential",
            AuthError::Forbidden => "forbidden",
        }
    }
}

/// Distinct causes of a token operation failing.
///
/// Only logged; verification callers never branch on these.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Signature mismatch")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Payload uses reserved claim '{0}'")]
    ReservedClaim(&'static str),

    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Password hashing failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Failed to hash password")]
    Hash,

    #[error("Stored password hash is malformed")]
    MalformedHash,
}
