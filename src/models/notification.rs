//! In-app notification record.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A notification addressed to one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,

    #[serde(default)]
    pub user_id: String,

    /// e.g. `book_purchase`, `exchange_request`
    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub message: String,

    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default, alias = "read")]
    pub is_read: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_item_id: Option<String>,

    #[serde(default, alias = "admin")]
    pub is_admin: bool,
}

impl Notification {
    pub fn new(user_id: impl Into<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: kind.into(),
            message: message.into(),
            timestamp: Utc::now().timestamp_millis(),
            ..Self::default()
        }
    }

    /// Creation time, when the timestamp is in range.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
