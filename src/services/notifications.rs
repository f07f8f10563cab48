// src/services/notifications.rs

//! Per-user and admin notifications. Every mutation goes by id.

use crate::api::{ApiClient, ApiRequest};
use crate::error::{AppError, Result};
use crate::models::Notification;
use crate::services::resource::{Created, Resource, ResourceClient};

impl Resource for Notification {
    const COLLECTION: &'static str = "Notifications";
    const LABEL: &'static str = "notification";

    fn id(&self) -> Option<&str> {
        self.notification_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.notification_id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(AppError::validation("Notification message is required."));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    client: ResourceClient<Notification>,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<Notification> {
        &self.client
    }

    /// Listing request for one user's inbox.
    pub fn for_user_request(user_id: &str) -> ApiRequest {
        ApiRequest::get(Notification::list_path()).query("userId", user_id)
    }

    /// Listing request for the admin inbox.
    pub fn for_admin_request(user_id: &str) -> ApiRequest {
        ApiRequest::get("/Notifications/admin").query("userId", user_id)
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        Self::require_user(user_id)?;
        self.client.fetch(Self::for_user_request(user_id)).await
    }

    pub async fn for_admin(&self, user_id: &str) -> Result<Vec<Notification>> {
        Self::require_user(user_id)?;
        self.client.fetch(Self::for_admin_request(user_id)).await
    }

    pub async fn add(&self, notification: &Notification) -> Result<Created<Notification>> {
        self.client.create(notification).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        self.client.transition(notification_id, "read").await?;
        Ok(())
    }

    pub async fn delete(&self, notification_id: &str) -> Result<()> {
        self.client.delete(notification_id).await
    }

    fn require_user(user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(AppError::MissingId("user"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::FakeTransport;
    use crate::services::collection::{CollectionView, RefreshPolicy};
    use std::sync::Arc;

    const INBOX: &str = r#"{"success":true,"data":[
        {"notificationId":"n1","userId":"u1","type":"book_purchase","message":"Sold","timestamp":1700000000000,"read":false},
        {"notificationId":"n2","userId":"u1","type":"exchange_request","message":"Sold","timestamp":1700000001000,"read":true}
    ]}"#;

    fn service() -> (Arc<FakeTransport>, NotificationService) {
        let fake = Arc::new(FakeTransport::new());
        (fake.clone(), NotificationService::new(ApiClient::new(fake)))
    }

    #[tokio::test]
    async fn test_for_user_sends_user_query() {
        let (fake, notifications) = service();
        fake.on(Method::Get, "/Notifications/", 200, INBOX);

        let list = notifications.for_user("u1").await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[1].is_read);
        let req = fake.last_request().unwrap();
        assert_eq!(req.query, vec![("userId".to_string(), "u1".to_string())]);
    }

    #[tokio::test]
    async fn test_delete_by_id_keeps_same_message_sibling() {
        let (fake, notifications) = service();
        fake.on(Method::Get, "/Notifications/", 200, INBOX);
        fake.on(Method::Delete, "/Notifications/n1", 200, r#"{"success":true}"#);

        let mut view = CollectionView::with_source(
            notifications.client().clone(),
            NotificationService::for_user_request("u1"),
            RefreshPolicy::Optimistic,
        );
        view.refresh().await.unwrap();
        view.remove("n1").await.unwrap();

        // Both carry the message "Sold"; only n1 goes.
        assert!(!view.contains("n1"));
        assert!(view.contains("n2"));
    }

    #[tokio::test]
    async fn test_mark_read_in_view() {
        let (fake, notifications) = service();
        fake.on(Method::Get, "/Notifications/", 200, INBOX);
        fake.on(Method::Put, "/Notifications/n1/read", 200, r#"{"success":true}"#);

        let mut view = CollectionView::with_source(
            notifications.client().clone(),
            NotificationService::for_user_request("u1"),
            RefreshPolicy::Optimistic,
        );
        view.refresh().await.unwrap();
        view.transition("n1", "read", |n| n.is_read = true).await.unwrap();
        assert!(view.find("n1").unwrap().is_read);
    }

    #[tokio::test]
    async fn test_missing_user_sends_nothing() {
        let (fake, notifications) = service();
        assert!(notifications.for_admin("").await.is_err());
        assert_eq!(fake.request_count(), 0);
    }
}
