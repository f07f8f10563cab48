// src/services/feedback.rs

//! Feedback threads attached to books.
//!
//! Feedback lives under `/Forums/feedback`, so its item route differs from
//! the conventional one and creation is nested under the book.

use serde_json::json;

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};
use crate::models::Feedback;
use crate::services::resource::{Resource, ResourceClient};

impl Resource for Feedback {
    const COLLECTION: &'static str = "Forums";
    const LABEL: &'static str = "feedback";

    fn id(&self) -> Option<&str> {
        self.feedback_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.feedback_id = Some(id);
    }

    fn item_path(id: &str) -> String {
        format!("/Forums/feedback/{}", segment(id))
    }
}

#[derive(Clone)]
pub struct FeedbackService {
    client: ResourceClient<Feedback>,
}

impl FeedbackService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<Feedback> {
        &self.client
    }

    pub fn for_book_request(book_id: &str) -> ApiRequest {
        ApiRequest::get(format!("/Forums/feedback/book/{}", segment(book_id)))
    }

    pub async fn for_book(&self, book_id: &str) -> Result<Vec<Feedback>> {
        let mut entries = self.client.fetch(Self::for_book_request(book_id)).await?;
        for entry in entries.iter_mut().filter(|e| e.book_id.is_none()) {
            entry.book_id = Some(book_id.to_string());
        }
        Ok(entries)
    }

    /// Leave feedback on a book; returns it with the server-assigned id.
    pub async fn add(&self, book_id: &str, text: &str) -> Result<Feedback> {
        if book_id.trim().is_empty() {
            return Err(AppError::MissingId("book"));
        }
        let text = validate_text(text)?;
        let request =
            ApiRequest::post(format!("/Forums/feedback/book/{}", segment(book_id)))
                .json(&json!({ "feedback": text }))?;
        let id: String = self.client.api().data(request).await?;
        Ok(Feedback {
            feedback_id: Some(id),
            book_id: Some(book_id.to_string()),
            feedback: text.to_string(),
            updated_at: None,
        })
    }

    pub async fn update(&self, feedback_id: &str, text: &str) -> Result<()> {
        if feedback_id.trim().is_empty() {
            return Err(AppError::MissingId(Feedback::LABEL));
        }
        let text = validate_text(text)?;
        let request = ApiRequest::put(Feedback::item_path(feedback_id))
            .json(&json!({ "feedback": text }))?;
        self.client.api().ack(request).await?;
        Ok(())
    }

    pub async fn delete(&self, feedback_id: &str) -> Result<()> {
        self.client.delete(feedback_id).await
    }
}

fn validate_text(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("Feedback cannot be empty."));
    }
    Ok(text)
}
