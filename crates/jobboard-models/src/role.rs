//! Account roles and the identity carried by an access token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User ID type (matches the store's integer primary key).
pub type UserId = i64;

/// Account role.
///
/// Roles are flat: no role implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    College,
    Student,
    User,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::College, Role::Student, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::College => "college",
            Role::Student => "student",
            Role::User => "user",
        }
    }

    /// Whether an account may pick this role for itself at signup.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "college" => Ok(Role::College),
            "student" => Ok(Role::Student),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Decoded payload of a valid access token.
///
/// Derived per request and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub id: UserId,
    pub role: Role,
}

impl VerifiedIdentity {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
