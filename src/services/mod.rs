// src/services/mod.rs

//! Client-side services over the backend API.
//!
//! - `session`: who is signed in, persisted across restarts
//! - `resource` / `collection`: generic CRUD client and list view state
//! - one service per backend resource
//! - `purchase`: the buy-a-book state machine

pub mod books;
pub mod cancel;
pub mod collection;
pub mod courses;
pub mod exchanges;
pub mod feedback;
pub mod flash;
pub mod notifications;
pub mod purchase;
pub mod reports;
pub mod resource;
pub mod session;
pub mod transactions;
pub mod users;
pub mod wishlist;

// Re-export for convenience
pub use books::BookService;
pub use cancel::{CancelHandle, CancelScope};
pub use collection::{CollectionView, RefreshPolicy};
pub use courses::CourseService;
pub use exchanges::ExchangeService;
pub use feedback::FeedbackService;
pub use flash::Flash;
pub use notifications::NotificationService;
pub use purchase::{PurchaseFlow, PurchaseState};
pub use reports::ReportService;
pub use resource::{Created, Resource, ResourceClient};
pub use session::SessionAuthority;
pub use transactions::TransactionService;
pub use users::UserService;
pub use wishlist::WishlistService;
