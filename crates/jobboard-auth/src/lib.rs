//! Stateless bearer-token authentication.
//!
//! This crate provides:
//! - HS256 token issuance and verification ([`TokenCodec`])
//! - `Authorization: Bearer` extraction over any header collection
//! - Exact-match role gating
//! - Argon2 password hashing
//!
//! Tokens are self-contained; there is no session store and no revocation.
//! A leaked token stays valid until it expires.

pub mod authenticator;
pub mod codec;
pub mod error;
pub mod gate;
pub mod password;
pub mod secret;

pub use authenticator::{authenticate, bearer_token, identify, HeaderLookup, AUTHORIZATION};
pub use codec::{TokenCodec, DEFAULT_TOKEN_TTL, RESERVED_CLAIMS};
pub use error::{AuthError, AuthResult, PasswordError, TokenError};
pub use gate::{authorize, authorize_any};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
pub use secret::{SigningSecret, JWT_SECRET_ENV};
