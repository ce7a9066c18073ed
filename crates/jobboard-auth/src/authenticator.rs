//! Bearer credential extraction and verification.
//!
//! Every entry point (middleware, extractors, inline checks) goes through
//! [`authenticate`], so the header rules live in one place.

use std::collections::HashMap;
use std::hash::BuildHasher;

use http::HeaderMap;

use jobboard_models::VerifiedIdentity;

use crate::codec::TokenCodec;
use crate::error::{AuthError, AuthResult};

/// Canonical header name.
pub const AUTHORIZATION: &str = "Authorization";

const BEARER_SCHEME: &str = "Bearer";

/// Read-only access to a request's header collection.
pub trait HeaderLookup {
    /// Look up a header value by name, ignoring ASCII case.
    fn header_value(&self, name: &str) -> Option<&str>;
}

impl HeaderLookup for HeaderMap {
    fn header_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}

impl<S: BuildHasher> HeaderLookup for HashMap<String, String, S> {
    fn header_value(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| self.get(&name.to_ascii_lowercase()))
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token<H: HeaderLookup + ?Sized>(headers: &H) -> AuthResult<&str> {
    let value = headers
        .header_value(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MissingCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

/// Resolve the caller's identity from request headers.
pub fn authenticate<H: HeaderLookup + ?Sized>(
    headers: &H,
    codec: &TokenCodec,
) -> AuthResult<VerifiedIdentity> {
    let token = bearer_token(headers)?;
    codec
        .verify_identity(token)
        .ok_or(AuthError::InvalidCredential)
}

/// Like [`authenticate`], but any failure is just "no identity".
pub fn identify<H: HeaderLookup + ?Sized>(
    headers: &H,
    codec: &TokenCodec,
) -> Option<VerifiedIdentity> {
    authenticate(headers, codec).ok()
}
