//! Per-user wishlist.

use serde::{Deserialize, Serialize};

use super::BookListing;

/// Books a user wants, with listing details joined in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub books: Vec<BookListing>,
}

impl Wishlist {
    pub fn contains(&self, book_id: &str) -> bool {
        self.books
            .iter()
            .any(|b| b.book_id.as_deref() == Some(book_id))
    }
}
