//! Signed-in session and user roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Role attached to an account by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
    Seller,
    /// Any role string the client does not know; kept verbatim
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Seller => "seller",
            Role::Other(s) => s,
        }
    }

    /// Landing page for this role.
    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Admin => "/admin-dashboard",
            Role::Teacher => "/teacher-dashboard",
            Role::Student => "/student-dashboard",
            Role::Parent => "/parent-dashboard",
            Role::Seller => "/seller-dashboard",
            Role::Other(_) => "/dashboard",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("role is empty"));
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "teacher" => Role::Teacher,
            "student" => Role::Student,
            "parent" => Role::Parent,
            "seller" => Role::Seller,
            _ => Role::Other(trimmed.to_string()),
        })
    }
}

impl TryFrom<String> for Role {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client-held record of who is signed in.
///
/// Trusted client state: there is no token or expiry behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub role: Role,
    /// Backend user id, when the verification response or a lookup provided it
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub derived_id: Option<String>,
}

impl Session {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            derived_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.derived_id = Some(id.into());
        self
    }
}

/// Body returned by `POST /auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedUser {
    pub email: String,
    pub role: Role,
    #[serde(default, alias = "userId")]
    pub id: Option<String>,
}

impl From<VerifiedUser> for Session {
    fn from(user: VerifiedUser) -> Self {
        Session {
            email: user.email,
            role: user.role,
            derived_id: user.id.filter(|id| !id.is_empty()),
        }
    }
}
