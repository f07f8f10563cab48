//! Free-text feedback left on a book.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "id")]
    pub feedback_id: Option<String>,

    #[serde(default)]
    pub book_id: Option<String>,

    pub feedback: String,

    /// Server timestamp of the last write
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "createdAt")]
    pub updated_at: Option<serde_json::Value>,
}
