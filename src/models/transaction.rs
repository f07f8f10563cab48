//! Purchase transaction records.

use serde::{Deserialize, Serialize};

/// A completed or pending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default)]
    pub book_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default, alias = "order status")]
    pub order_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Book details joined onto a buyer's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedBook {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub price: Option<f64>,
}
