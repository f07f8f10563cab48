// src/services/wishlist.rs

//! A user's wishlist of book listings.

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};
use crate::models::Wishlist;

#[derive(Clone)]
pub struct WishlistService {
    api: ApiClient,
}

impl WishlistService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The wishlist with book details joined in. No wishlist yet reads as empty.
    pub async fn for_user(&self, user_id: &str) -> Result<Wishlist> {
        let path = format!("/wishlist/user/{}/books", segment(user_id));
        self.fetch(ApiRequest::get(path)).await
    }

    /// A student's wishlist, as their parent sees it.
    pub async fn for_email(&self, email: &str) -> Result<Wishlist> {
        let path = format!("/wishlist/user/email/{}/books", segment(email));
        self.fetch(ApiRequest::get(path)).await
    }

    async fn fetch(&self, request: ApiRequest) -> Result<Wishlist> {
        match self.api.envelope::<Wishlist>(request).await {
            Ok(envelope) => Ok(envelope.data.unwrap_or_default()),
            Err(AppError::Server { status: 404, .. }) | Err(AppError::Status { status: 404, .. }) => {
                Ok(Wishlist::default())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn add_book(&self, user_id: &str, book_id: &str) -> Result<()> {
        self.api
            .ack(ApiRequest::post(Self::book_path("addBook", user_id, book_id)?))
            .await?;
        log::info!("Added book {} to wishlist", book_id);
        Ok(())
    }

    pub async fn remove_book(&self, user_id: &str, book_id: &str) -> Result<()> {
        self.api
            .ack(ApiRequest::delete(Self::book_path("removeBook", user_id, book_id)?))
            .await?;
        log::info!("Removed book {} from wishlist", book_id);
        Ok(())
    }

    fn book_path(action: &str, user_id: &str, book_id: &str) -> Result<String> {
        if user_id.trim().is_empty() {
            return Err(AppError::MissingId("user"));
        }
        if book_id.trim().is_empty() {
            return Err(AppError::MissingId("book"));
        }
        Ok(format!(
            "/wishlist/{}/{}/{}",
            action,
            segment(user_id),
            segment(book_id)
        ))
    }
}
