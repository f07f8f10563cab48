//! Transient messages that dismiss themselves.

use std::time::Duration;

use tokio::time::Instant;

/// A single transient message slot.
///
/// Expiry is checked on read; nothing runs in the background.
#[derive(Debug, Clone)]
pub struct Flash {
    ttl: Duration,
    current: Option<(String, Instant)>,
}

impl Flash {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Show a message, replacing any previous one.
    pub fn show(&mut self, message: impl Into<String>) {
        self.current = Some((message.into(), Instant::now() + self.ttl));
    }

    /// The message, if it has not expired yet.
    pub fn message(&self) -> Option<&str> {
        match &self.current {
            Some((message, expires)) if Instant::now() < *expires => Some(message),
            _ => None,
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
