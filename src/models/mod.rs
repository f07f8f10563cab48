// src/models/mod.rs

//! Domain models for the book exchange client.
//!
//! Server-owned records mirror the backend's camelCase JSON. The client never
//! owns them; it only reflects what the server returns.

mod book;
mod config;
mod course;
mod envelope;
mod exchange;
mod feedback;
mod notification;
mod report;
mod session;
mod transaction;
mod user;
mod wishlist;

// Re-export all public types
pub use book::BookListing;
pub use config::{ApiConfig, Config, FlashConfig, SessionConfig, ShimConfig};
pub use course::Course;
pub use envelope::Envelope;
pub use exchange::{Exchange, ExchangeStatus};
pub use feedback::Feedback;
pub use notification::Notification;
pub use report::{Report, ReportKind};
pub use session::{Role, Session, VerifiedUser};
pub use transaction::{PurchasedBook, Transaction};
pub use user::UserRecord;
pub use wishlist::Wishlist;
