//! Signed token issuance and verification.
//!
//! Tokens are standard three-part HS256 JWTs: `header.claims.signature`.
//! The claims are the caller's payload flattened next to `iat` and `exp`.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use jobboard_models::VerifiedIdentity;

use crate::error::TokenError;
use crate::secret::SigningSecret;

/// Default token lifetime (one day).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(86_400);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claim names the codec owns; payloads may not use them.
pub const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Claims as they appear on the wire.
#[derive(Debug, Deserialize)]
struct Envelope<P> {
    #[serde(flatten)]
    payload: P,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies signed tokens with a fixed secret.
///
/// Immutable after construction, so one instance is shared across all
/// request handlers.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Option<Keys>,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec. A `None` secret yields a codec whose every operation fails.
    pub fn new(secret: Option<SigningSecret>) -> Self {
        let keys = secret.map(|secret| Keys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        });
        Self {
            keys,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the lifetime used by [`TokenCodec::issue_identity`].
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn has_secret(&self) -> bool {
        self.keys.is_some()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `payload` into a token that expires `ttl` from now.
    pub fn issue<P: Serialize>(&self, payload: &P, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(payload, Utc::now().timestamp(), ttl)
    }

    /// Sign an identity with the codec's configured lifetime.
    pub fn issue_identity(&self, identity: &VerifiedIdentity) -> Result<String, TokenError> {
        self.issue(identity, self.ttl)
    }

    fn issue_at<P: Serialize>(
        &self,
        payload: &P,
        issued_at: i64,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| TokenError::Encoding("ttl out of range".to_string()))?;

        let mut claims = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(TokenError::Encoding(
                    "payload must serialize to a JSON object".to_string(),
                ))
            }
            Err(e) => return Err(TokenError::Encoding(e.to_string())),
        };

        if let Some(key) = RESERVED_CLAIMS.iter().find(|k| claims.contains_key(**k)) {
            return Err(TokenError::ReservedClaim(*key));
        }

        claims.insert("iat".to_string(), Value::from(issued_at));
        claims.insert("exp".to_string(), Value::from(issued_at.saturating_add(ttl_secs)));

        encode(&Header::new(ALGORITHM), &claims, &keys.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token and return its payload, reporting the failure cause.
    pub fn try_verify<P: DeserializeOwned>(&self, token: &str) -> Result<P, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = decode::<Envelope<P>>(token, &keys.decoding, &validation)?;

        // The library accepts exp == now; a token must expire strictly in the future.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.payload)
    }

    /// Verify a token and return its payload, or `None` for any failure.
    pub fn verify<P: DeserializeOwned>(&self, token: &str) -> Option<P> {
        match self.try_verify(token) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(cause = %e, "Token verification failed");
                None
            }
        }
    }

    pub fn verify_identity(&self, token: &str) -> Option<VerifiedIdentity> {
        self.verify(token)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("has_secret", &self.has_secret())
            .field("ttl", &self.ttl)
            .finish()
    }
}
