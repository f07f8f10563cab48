//! Textbook listing record.

use serde::{Deserialize, Serialize};

/// A textbook offered on the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default, rename = "ISBN", alias = "isbn")]
    pub isbn: String,

    #[serde(default)]
    pub edition: String,

    #[serde(default)]
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,

    /// Seller's user id
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "sellerId")]
    pub user_id: Option<String>,

    #[serde(default, alias = "digital")]
    pub is_digital: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_copy_path: Option<String>,

    #[serde(default)]
    pub condition: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u32>,

    /// Emails of buyers who own a copy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owned_by: Vec<String>,
}

impl BookListing {
    pub fn new(title: impl Into<String>, author: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            price,
            ..Self::default()
        }
    }

    /// Whether the given email already owns a copy.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owned_by.iter().any(|e| e.eq_ignore_ascii_case(email))
    }
}
