//! User account record.

use serde::{Deserialize, Serialize};

/// A user account as the backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Backend document id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    pub email: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub major: Option<String>,

    #[serde(default)]
    pub profile_picture: Option<String>,

    #[serde(default)]
    pub balance: f64,

    #[serde(default, alias = "active")]
    pub is_active: bool,

    #[serde(default)]
    pub seller_rating: Option<f64>,

    #[serde(default)]
    pub seller_rating_count: Option<u32>,

    /// Only sent when creating an account
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub password: Option<String>,
}

impl UserRecord {
    /// Build a new account for creation.
    pub fn new(email: impl Into<String>, role: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: role.into(),
            password: Some(password.into()),
            is_active: true,
            ..Self::default()
        }
    }

    /// Average seller rating formatted for display.
    pub fn rating_label(&self) -> String {
        match (self.seller_rating, self.seller_rating_count) {
            (Some(rating), Some(count)) if count > 0 => format!("{rating:.1} ({count})"),
            _ => "unrated".to_string(),
        }
    }
}
