//! Book-for-book exchange requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of an exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    /// Both books have changed hands.
    Completed,
    #[serde(other)]
    Unknown,
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "pending",
            ExchangeStatus::Accepted => "accepted",
            ExchangeStatus::Rejected => "rejected",
            ExchangeStatus::Completed => "completed",
            ExchangeStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to swap one book for another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_id: Option<String>,

    pub offered_book_id: String,

    pub requested_book_id: String,

    pub requester_id: String,

    pub owner_id: String,

    #[serde(default)]
    pub status: ExchangeStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_by: Option<String>,
}

impl Exchange {
    pub fn is_pending(&self) -> bool {
        self.status == ExchangeStatus::Pending
    }
}
