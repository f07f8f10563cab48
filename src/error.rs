// src/error.rs

//! Unified error handling for the book exchange client.
//!
//! Errors fall into three families that every view normalizes to a
//! displayable string:
//! - validation failures caught before any request is sent
//! - business errors reported by the server (`success: false`)
//! - transport errors (network failures, non-2xx responses)

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Message shown when the verification endpoint refuses a deactivated account.
pub const DEACTIVATED_MESSAGE: &str =
    "Your account is deactivated. Please contact an administrator.";

/// Message shown for any other rejected login.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials or account issue";

/// Message shown when a purchase is attempted with too small a balance.
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Insufficient funds.";

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// Balance lower than the listing price
    #[error("{}", INSUFFICIENT_FUNDS_MESSAGE)]
    InsufficientFunds,

    /// Operation requires a signed-in session
    #[error("No user is signed in")]
    NotSignedIn,

    /// Mutation attempted on a record without a stable identifier
    #[error("{0} has no identifier")]
    MissingId(&'static str),

    /// Verification endpoint answered 403
    #[error("{}", DEACTIVATED_MESSAGE)]
    AccountDeactivated,

    /// Server answered with `success: false`
    #[error("Server rejected request ({status}): {message}")]
    Server { status: u16, message: String },

    /// Non-2xx response without a usable envelope
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request abandoned because its owning view was closed
    #[error("Request cancelled")]
    Cancelled,

    /// Token signing failed
    #[cfg(feature = "shim")]
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hash verification failed
    #[cfg(feature = "shim")]
    #[error("Hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a server-reported error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// True for errors raised before any request left the client.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InsufficientFunds | Self::NotSignedIn | Self::MissingId(_)
        )
    }

    /// True for network-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    /// Normalize to the string a view stores and shows.
    pub fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Server { message, .. } => message.clone(),
            Self::Status { status, body } if body.trim().is_empty() => {
                format!("Request failed with status {status}")
            }
            Self::Status { body, .. } => body.trim().to_string(),
            other => other.to_string(),
        }
    }
}
