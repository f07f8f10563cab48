// src/services/transactions.rs

//! Transactions and purchase history.

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::Result;
use crate::models::{PurchasedBook, Transaction};
use crate::services::resource::{Created, Resource, ResourceClient};

impl Resource for Transaction {
    const COLLECTION: &'static str = "Transactions";
    const LABEL: &'static str = "transaction";

    fn id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.transaction_id = Some(id);
    }
}

#[derive(Clone)]
pub struct TransactionService {
    client: ResourceClient<Transaction>,
}

impl TransactionService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<Transaction> {
        &self.client
    }

    pub async fn list(&self) -> Result<Vec<Transaction>> {
        self.client.fetch_all().await
    }

    pub async fn add(&self, transaction: &Transaction) -> Result<Created<Transaction>> {
        self.client.create(transaction).await
    }

    pub async fn update(&self, transaction: &Transaction) -> Result<()> {
        self.client.update(transaction).await
    }

    pub async fn delete(&self, transaction_id: &str) -> Result<()> {
        self.client.delete(transaction_id).await
    }

    /// Books a user has bought. A 204 means none.
    pub async fn purchased_by(&self, user_id: &str) -> Result<Vec<PurchasedBook>> {
        let path = format!("/Transactions/purchased/{}", segment(user_id));
        self.client.api().list(ApiRequest::get(path)).await
    }

    /// A student's transactions, as their parent sees them.
    pub async fn by_student_email(&self, email: &str) -> Result<Vec<Transaction>> {
        self.client
            .fetch_at(format!("/Transactions/student/email/{}", segment(email)))
            .await
    }
}
