//! The `{ success, message, data }` wrapper every backend response uses.

use serde::{Deserialize, Serialize};

/// Envelope response from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Server-side detail, usually an exception message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// Envelope used for empty 2xx bodies.
    pub fn empty_success() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            error: None,
        }
    }

    /// Best message for display: `message`, else a string `error`.
    pub fn describe(&self) -> Option<String> {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| match &self.error {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            })
    }
}
