//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend endpoint and HTTP behavior
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the signed-in session is persisted
    #[serde(default)]
    pub session: SessionConfig,

    /// Transient message behavior
    #[serde(default)]
    pub flash: FlashConfig,

    /// Legacy login shim settings
    #[serde(default)]
    pub shim: ShimConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.flash.dismiss_secs == 0 {
            return Err(AppError::validation("flash.dismiss_secs must be > 0"));
        }
        if self.shim.token_ttl_hours <= 0 {
            return Err(AppError::validation("shim.token_ttl_hours must be > 0"));
        }
        Ok(())
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding persisted keys
    #[serde(default = "defaults::storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_dir: defaults::storage_dir(),
        }
    }
}

/// Transient message settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Seconds before a success message is dismissed
    #[serde(default = "defaults::dismiss_secs")]
    pub dismiss_secs: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            dismiss_secs: defaults::dismiss_secs(),
        }
    }
}

/// Legacy login shim settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Listen address
    #[serde(default = "defaults::bind")]
    pub bind: String,

    /// TOML file with the user directory
    #[serde(default = "defaults::users_file")]
    pub users_file: PathBuf,

    /// HS256 signing secret (overridden by `BOOKEXCHANGE_JWT_SECRET`)
    #[serde(default = "defaults::jwt_secret")]
    pub jwt_secret: String,

    /// Token lifetime in hours
    #[serde(default = "defaults::token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl ShimConfig {
    /// Secret to sign with, preferring the environment.
    pub fn secret(&self) -> String {
        std::env::var("BOOKEXCHANGE_JWT_SECRET").unwrap_or_else(|_| self.jwt_secret.clone())
    }
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            users_file: defaults::users_file(),
            jwt_secret: defaults::jwt_secret(),
            token_ttl_hours: defaults::token_ttl_hours(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Api defaults
    pub fn base_url() -> String {
        "http://localhost:8080".into()
    }
    pub fn user_agent() -> String {
        concat!("bookexchange/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Session defaults
    pub fn storage_dir() -> PathBuf {
        PathBuf::from(".bookexchange")
    }

    // Flash defaults
    pub fn dismiss_secs() -> u64 {
        10
    }

    // Shim defaults
    pub fn bind() -> String {
        "127.0.0.1:3001".into()
    }
    pub fn users_file() -> PathBuf {
        PathBuf::from("users.toml")
    }
    pub fn jwt_secret() -> String {
        "change-me".into()
    }
    pub fn token_ttl_hours() -> i64 {
        24
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.flash.dismiss_secs, 10);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://books.example:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://books.example:9000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.storage_dir, PathBuf::from(".bookexchange"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.flash.dismiss_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(tmp.path().join("missing.toml"));
        assert_eq!(config.api.user_agent, defaults::user_agent());
    }
}
