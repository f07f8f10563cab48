// src/services/books.rs

//! Textbook listings.

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};
use crate::models::BookListing;
use crate::services::resource::{Created, Resource, ResourceClient};

impl Resource for BookListing {
    const COLLECTION: &'static str = "Books";
    const LABEL: &'static str = "book";

    fn id(&self) -> Option<&str> {
        self.book_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.book_id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        validate_listing(self)
    }
}

/// Listing operations plus the purchase call.
#[derive(Clone)]
pub struct BookService {
    client: ResourceClient<BookListing>,
}

impl BookService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<BookListing> {
        &self.client
    }

    pub async fn list(&self) -> Result<Vec<BookListing>> {
        self.client.fetch_all().await
    }

    /// Listings posted by one seller.
    pub async fn by_seller(&self, user_id: &str) -> Result<Vec<BookListing>> {
        self.client.fetch(Self::by_seller_request(user_id)).await
    }

    pub fn by_seller_request(user_id: &str) -> ApiRequest {
        ApiRequest::get(format!("/Books/Users/{}", segment(user_id)))
    }

    /// Listings attached to a course.
    pub async fn by_course(&self, course_id: &str) -> Result<Vec<BookListing>> {
        self.client
            .fetch_at(format!("/Books/Courses/{}", segment(course_id)))
            .await
    }

    /// Books a buyer owns.
    pub async fn owned_by(&self, email: &str) -> Result<Vec<BookListing>> {
        self.client
            .fetch_at(format!("/Books/owned/email/{}", segment(email)))
            .await
    }

    /// Rate an owned book from 1 to 5.
    pub async fn rate(&self, book_title: &str, rater_email: &str, rating: u8) -> Result<()> {
        validate_rating(rating)?;
        let body = serde_json::json!({
            "bookTitle": book_title,
            "userEmail": rater_email,
            "rating": rating,
        });
        self.client
            .api()
            .ack(ApiRequest::post("/Books/rate").json(&body)?)
            .await?;
        Ok(())
    }

    pub async fn add(&self, book: &BookListing) -> Result<Created<BookListing>> {
        self.client.create(book).await
    }

    pub async fn update(&self, book: &BookListing) -> Result<()> {
        self.client.update(book).await
    }

    pub async fn delete(&self, book_id: &str) -> Result<()> {
        self.client.delete(book_id).await
    }

    /// Buy a listing; the server returns the buyer's new balance.
    pub async fn purchase(&self, book_id: &str, buyer_email: &str) -> Result<(f64, Option<String>)> {
        if book_id.trim().is_empty() {
            return Err(AppError::MissingId(BookListing::LABEL));
        }
        let path = format!(
            "/Books/{}/purchase/email/{}",
            segment(book_id),
            segment(buyer_email)
        );
        let envelope = self.client.api().envelope::<f64>(ApiRequest::put(path)).await?;
        let balance = envelope
            .data
            .ok_or_else(|| AppError::server(200, "Purchase returned no balance"))?;
        log::info!("Purchased book {} for {}", book_id, buyer_email);
        Ok((balance, envelope.message))
    }
}

/// Title and a non-negative price are required before a listing is sent.
pub fn validate_listing(book: &BookListing) -> Result<()> {
    if book.title.trim().is_empty() {
        return Err(AppError::validation("Title is required."));
    }
    if !book.price.is_finite() || book.price < 0.0 {
        return Err(AppError::validation("Price must be a non-negative number."));
    }
    Ok(())
}

/// Ratings run from 1 to 5.
pub fn validate_rating(rating: u8) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::validation("Rating must be between 1 and 5."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::FakeTransport;
    use crate::services::{CollectionView, RefreshPolicy};
    use std::sync::Arc;

    fn service() -> (Arc<FakeTransport>, BookService) {
        let fake = Arc::new(FakeTransport::new());
        (fake.clone(), BookService::new(ApiClient::new(fake)))
    }

    #[tokio::test]
    async fn test_list_parses_backend_fields() {
        let (fake, books) = service();
        fake.on(
            Method::Get,
            "/Books/",
            200,
            r#"{"success":true,"data":[{"bookId":"b1","title":"Calculus","ISBN":"123","price":40.0,"digital":true}]}"#,
        );

        let list = books.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].isbn, "123");
        assert!(list[0].is_digital);
    }

    #[tokio::test]
    async fn test_purchase_returns_server_balance() {
        let (fake, books) = service();
        fake.on(
            Method::Put,
            "/Books/b1/purchase/email/a%40b.com",
            200,
            r#"{"success":true,"message":"Book purchased","data":12.5}"#,
        );

        let (balance, message) = books.purchase("b1", "a@b.com").await.unwrap();
        assert_eq!(balance, 12.5);
        assert_eq!(message.as_deref(), Some("Book purchased"));
    }

    #[tokio::test]
    async fn test_invalid_listing_sends_nothing() {
        let (fake, books) = service();

        let untitled = BookListing::new(" ", "Author", 10.0);
        assert!(books.add(&untitled).await.unwrap_err().is_local());

        let negative = BookListing::new("Title", "Author", -1.0);
        assert!(books.add(&negative).await.is_err());
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_view_add_validates_listing() {
        let (fake, books) = service();
        let mut view = CollectionView::new(books.client().clone(), RefreshPolicy::Refetch);

        let err = view.add(BookListing::new("", "x", -5.0)).await.unwrap_err();
        assert!(err.is_local());
        assert_eq!(view.error(), Some("Title is required."));

        let mut listed = BookListing::new("Calculus", "Stewart", 40.0);
        listed.book_id = Some("b1".into());
        listed.price = -1.0;
        assert!(view.update(listed).await.is_err());
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_rate_bounds() {
        let (fake, books) = service();
        assert!(books.rate("Calculus", "a@b.com", 6).await.is_err());
        assert_eq!(fake.request_count(), 0);

        fake.on(Method::Post, "/Books/rate", 200, r#"{"success":true}"#);
        books.rate("Calculus", "a@b.com", 4).await.unwrap();
        assert_eq!(fake.last_request().unwrap().body.unwrap()["rating"], 4);
    }

    #[tokio::test]
    async fn test_by_seller_route() {
        let (fake, books) = service();
        fake.respond(200, r#"{"success":true,"data":[]}"#);

        books.by_seller("u1").await.unwrap();
        assert_eq!(fake.last_request().unwrap().path, "/Books/Users/u1");
    }
}
