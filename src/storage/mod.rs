//! Persistent key/value storage for client state.
//!
//! Mirrors browser `localStorage` semantics: string values under string
//! keys, surviving restarts. The signed-in session lives under
//! [`SESSION_KEY`].
//!
//! ## Directory Structure
//!
//! ```text
//! .bookexchange/
//! └── currentUser.json      # Persisted session
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Key holding the persisted session.
pub const SESSION_KEY: &str = "currentUser";

/// Trait for client-side storage backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
