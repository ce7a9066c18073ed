//! Process-wide token signing secret.

use std::fmt;

/// Environment variable holding the signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// HMAC signing secret.
///
/// Never empty. The value is redacted from `Debug` output.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wrap a secret value. Returns `None` for an empty or blank value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Read the secret from `JWT_SECRET`.
    ///
    /// Absence is not an error here; every signing and verification call
    /// fails instead.
    pub fn from_env() -> Option<Self> {
        std::env::var(JWT_SECRET_ENV).ok().and_then(Self::new)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}
