// src/services/users.rs

//! User accounts: admin management, profile edits, balances, parent links.

use serde_json::json;

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};
use crate::models::UserRecord;
use crate::services::books::validate_rating;
use crate::services::resource::{Created, Resource, ResourceClient};

impl Resource for UserRecord {
    const COLLECTION: &'static str = "Users";
    const LABEL: &'static str = "user";

    fn id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.user_id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(AppError::validation("Email is required."));
        }
        Ok(())
    }
}

/// Minimum length accepted for a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct UserService {
    client: ResourceClient<UserRecord>,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<UserRecord> {
        &self.client
    }

    fn api(&self) -> &ApiClient {
        self.client.api()
    }

    pub async fn list(&self) -> Result<Vec<UserRecord>> {
        self.client.fetch_all().await
    }

    pub async fn add(&self, user: &UserRecord) -> Result<Created<UserRecord>> {
        self.client.create(user).await
    }

    pub async fn update(&self, user: &UserRecord) -> Result<()> {
        self.client.update(user).await
    }

    pub async fn delete(&self, user_id: &str) -> Result<()> {
        self.client.delete(user_id).await
    }

    pub async fn activate(&self, user_id: &str) -> Result<Option<String>> {
        self.client.transition(user_id, "activate").await
    }

    pub async fn deactivate(&self, user_id: &str) -> Result<Option<String>> {
        self.client.transition(user_id, "deactivate").await
    }

    pub async fn change_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        let request = ApiRequest::put(format!("{}/password", UserRecord::item_path(user_id)))
            .json(&json!({ "newPassword": new_password }))?;
        self.api().ack(request).await?;
        log::info!("Changed password for user {}", user_id);
        Ok(())
    }

    /// Change the account email on the server. The caller re-establishes the session.
    pub async fn update_email(&self, user_id: &str, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required."));
        }
        let request = ApiRequest::put(format!("{}/email", UserRecord::item_path(user_id)))
            .json(&json!({ "email": email }))?;
        self.api().ack(request).await?;
        Ok(())
    }

    pub async fn balance_by_email(&self, email: &str) -> Result<f64> {
        let path = format!("/Users/balance/email/{}", segment(email));
        self.api().data(ApiRequest::get(path)).await
    }

    /// Set a student's balance, as a parent does.
    pub async fn set_balance(&self, email: &str, balance: f64) -> Result<()> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(AppError::validation("Balance must be a non-negative number."));
        }
        let path = format!("/Users/balance/email/{}", segment(email));
        let request = ApiRequest::put(path).query("balance", balance.to_string());
        self.api().ack(request).await?;
        Ok(())
    }

    pub async fn id_by_email(&self, email: &str) -> Result<String> {
        let path = format!("/Users/id/email/{}", segment(email));
        self.api().data(ApiRequest::get(path)).await
    }

    /// Rate a seller from 1 to 5.
    pub async fn rate_seller(&self, seller_id: &str, rater_email: &str, rating: u8) -> Result<()> {
        validate_rating(rating)?;
        // The backend reads the seller's id from `sellerEmail`.
        let request = ApiRequest::post("/Users/rate/seller").json(&json!({
            "sellerEmail": seller_id,
            "raterEmail": rater_email,
            "rating": rating,
        }))?;
        self.api().ack(request).await?;
        Ok(())
    }

    /// Students linked to a parent account.
    pub async fn students_of(&self, parent_email: &str) -> Result<Vec<UserRecord>> {
        self.client
            .fetch_at(format!("/Users/students/email/{}", segment(parent_email)))
            .await
    }

    pub async fn link_student(&self, parent_email: &str, student_email: &str) -> Result<()> {
        self.api()
            .ack(ApiRequest::post(Self::student_link_path(parent_email, student_email)))
            .await?;
        Ok(())
    }

    pub async fn unlink_student(&self, parent_email: &str, student_email: &str) -> Result<()> {
        self.api()
            .ack(ApiRequest::delete(Self::student_link_path(parent_email, student_email)))
            .await?;
        Ok(())
    }

    fn student_link_path(parent_email: &str, student_email: &str) -> String {
        format!(
            "/Users/students/email/{}/student/{}",
            segment(parent_email),
            segment(student_email)
        )
    }
}
