//! Moderation report record.

use serde::{Deserialize, Serialize};

/// What a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Seller,
    Book,
    #[serde(other)]
    General,
}

/// A report filed by a user for administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "id")]
    pub report_id: Option<String>,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<ReportKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<serde_json::Value>,
}

impl Report {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            report_id: None,
            content: content.into(),
            report_type: None,
            reported_by: None,
            seller_email: None,
            user_email: None,
            book_title: None,
            created_at: None,
        }
    }
}
