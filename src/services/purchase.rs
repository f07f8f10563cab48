// src/services/purchase.rs

//! Buying a listing with the signed-in user's balance.
//!
//! Local checks (signed in, enough funds) run before any request. The
//! balance shown after a purchase is always the value the server returned.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::{AppError, INSUFFICIENT_FUNDS_MESSAGE, Result};
use crate::models::BookListing;
use crate::services::books::BookService;
use crate::services::cancel::CancelScope;
use crate::services::flash::Flash;
use crate::services::session::SessionAuthority;
use crate::services::users::UserService;

/// Shown when nobody is signed in at purchase time.
pub const REFRESH_MESSAGE: &str = "An error occurred. Please refresh and try again.";

/// Shown for failures the server did not explain.
pub const PURCHASE_FAILED_MESSAGE: &str = "An error occurred during purchase.";

/// Shown when the server confirms without a message.
pub const PURCHASE_SUCCESS_MESSAGE: &str = "Purchase successful.";

/// Where the flow is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PurchaseState {
    #[default]
    Idle,
    Purchasing,
    Succeeded { message: String, balance: f64 },
    Failed(String),
}

/// Purchase state for one textbook page.
pub struct PurchaseFlow {
    session: Arc<SessionAuthority>,
    books: BookService,
    users: UserService,
    balance: Option<f64>,
    state: PurchaseState,
    flash: Flash,
    scope: CancelScope,
}

impl PurchaseFlow {
    pub fn new(session: Arc<SessionAuthority>, api: ApiClient, flash: Flash) -> Self {
        Self {
            session,
            books: BookService::new(api.clone()),
            users: UserService::new(api),
            balance: None,
            state: PurchaseState::Idle,
            flash,
            scope: CancelScope::new(),
        }
    }

    /// Last balance the server reported, if any.
    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn state(&self) -> &PurchaseState {
        &self.state
    }

    /// The success message, until it auto-dismisses.
    pub fn flash_message(&self) -> Option<&str> {
        self.flash.message()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    /// Fetch the signed-in user's balance for display.
    pub async fn load_balance(&mut self) -> Result<f64> {
        let session = self.session.require()?;
        let balance = self
            .scope
            .run(self.users.balance_by_email(&session.email))
            .await
            .inspect_err(|e| log::warn!("Could not load balance for {}: {}", session.email, e))?;
        self.balance = Some(balance);
        Ok(balance)
    }

    /// Buy `book`; on success returns the new balance.
    pub async fn purchase(&mut self, book: &BookListing) -> Result<f64> {
        let Some(session) = self.session.current() else {
            self.state = PurchaseState::Failed(REFRESH_MESSAGE.to_string());
            return Err(AppError::NotSignedIn);
        };

        // Unknown balance counts as zero.
        let available = self.balance.unwrap_or(0.0);
        if available < book.price {
            log::info!(
                "Refusing purchase of {:?}: balance {:.2} < price {:.2}",
                book.title,
                available,
                book.price
            );
            self.state = PurchaseState::Failed(INSUFFICIENT_FUNDS_MESSAGE.to_string());
            return Err(AppError::InsufficientFunds);
        }

        let Some(book_id) = book.book_id.as_deref().filter(|id| !id.is_empty()) else {
            self.state = PurchaseState::Failed(PURCHASE_FAILED_MESSAGE.to_string());
            return Err(AppError::MissingId("book"));
        };

        self.state = PurchaseState::Purchasing;
        let result = self
            .scope
            .run(self.books.purchase(book_id, &session.email))
            .await;

        match result {
            Ok((balance, message)) => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| PURCHASE_SUCCESS_MESSAGE.to_string());
                self.balance = Some(balance);
                self.flash.show(message.clone());
                self.state = PurchaseState::Succeeded { message, balance };
                Ok(balance)
            }
            Err(AppError::Cancelled) => {
                self.state = PurchaseState::Idle;
                Err(AppError::Cancelled)
            }
            Err(e) => {
                let message = match &e {
                    AppError::Server { message, .. } => message.clone(),
                    _ => PURCHASE_FAILED_MESSAGE.to_string(),
                };
                log::warn!("Purchase of {} failed: {}", book_id, e);
                self.state = PurchaseState::Failed(message);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::FakeTransport;
    use crate::models::{Role, Session};
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    const BALANCE: &str = "/Users/balance/email/a%40b.com";
    const PURCHASE: &str = "/Books/b1/purchase/email/a%40b.com";

    async fn flow(signed_in: bool) -> (Arc<FakeTransport>, PurchaseFlow) {
        let fake = Arc::new(FakeTransport::new());
        let api = ApiClient::new(fake.clone());
        let session =
            SessionAuthority::restore(api.clone(), Arc::new(MemoryStorage::new())).await;
        if signed_in {
            session
                .establish(Session::new("a@b.com", Role::Student))
                .await
                .unwrap();
        }
        (fake, PurchaseFlow::new(Arc::new(session), api, Flash::from_secs(10)))
    }

    fn book(price: f64) -> BookListing {
        let mut book = BookListing::new("Calculus", "Stewart", price);
        book.book_id = Some("b1".into());
        book
    }

    #[tokio::test]
    async fn test_insufficient_funds_sends_no_purchase() {
        let (fake, mut flow) = flow(true).await;
        fake.on(Method::Get, BALANCE, 200, r#"{"success":true,"data":10.0}"#);

        flow.load_balance().await.unwrap();
        let err = flow.purchase(&book(25.0)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
        assert_eq!(
            flow.state(),
            &PurchaseState::Failed("Insufficient funds.".into())
        );
        // Only the balance lookup went out.
        assert_eq!(fake.request_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_balance_counts_as_zero() {
        let (fake, mut flow) = flow(true).await;

        assert!(flow.purchase(&book(1.0)).await.is_err());
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_not_signed_in() {
        let (fake, mut flow) = flow(false).await;

        assert!(matches!(
            flow.purchase(&book(0.0)).await,
            Err(AppError::NotSignedIn)
        ));
        assert_eq!(flow.state(), &PurchaseState::Failed(REFRESH_MESSAGE.into()));
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_balance_is_server_value() {
        let (fake, mut flow) = flow(true).await;
        fake.on(Method::Get, BALANCE, 200, r#"{"success":true,"data":50.0}"#);
        // Not 50 - 20: the server is the source of truth.
        fake.on(
            Method::Put,
            PURCHASE,
            200,
            r#"{"success":true,"message":"Book purchased successfully","data":31.5}"#,
        );

        flow.load_balance().await.unwrap();
        assert_eq!(flow.purchase(&book(20.0)).await.unwrap(), 31.5);
        assert_eq!(flow.balance(), Some(31.5));
        assert_eq!(
            flow.state(),
            &PurchaseState::Succeeded {
                message: "Book purchased successfully".into(),
                balance: 31.5,
            }
        );
    }

    #[tokio::test]
    async fn test_server_rejection_message() {
        let (fake, mut flow) = flow(true).await;
        fake.on(Method::Get, BALANCE, 200, r#"{"success":true,"data":50.0}"#);
        fake.on(
            Method::Put,
            PURCHASE,
            400,
            r#"{"success":false,"message":"Book already owned"}"#,
        );

        flow.load_balance().await.unwrap();
        assert!(flow.purchase(&book(20.0)).await.is_err());
        assert_eq!(flow.state(), &PurchaseState::Failed("Book already owned".into()));
        assert_eq!(flow.balance(), Some(50.0));
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let (fake, mut flow) = flow(true).await;
        fake.on(Method::Get, BALANCE, 200, r#"{"success":true,"data":50.0}"#);
        flow.load_balance().await.unwrap();

        fake.offline();
        assert!(flow.purchase(&book(20.0)).await.is_err());
        assert_eq!(
            flow.state(),
            &PurchaseState::Failed(PURCHASE_FAILED_MESSAGE.into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_message_dismisses() {
        let (fake, mut flow) = flow(true).await;
        fake.on(Method::Get, BALANCE, 200, r#"{"success":true,"data":50.0}"#);
        fake.on(Method::Put, PURCHASE, 200, r#"{"success":true,"data":30.0}"#);

        flow.load_balance().await.unwrap();
        flow.purchase(&book(20.0)).await.unwrap();
        assert_eq!(flow.flash_message(), Some(PURCHASE_SUCCESS_MESSAGE));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(flow.flash_message().is_none());
    }
}
