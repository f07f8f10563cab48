//! Local filesystem storage implementation.
//!
//! Each key is stored as `{root}/{key}.json`. Writes go to a temp file
//! first and are renamed into place, so a crash never leaves a half
//! written session behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::KeyValueStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key.
    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::validation(format!("invalid storage key '{key}'")));
        }
        Ok(self.root_dir.join(format!("{key}.json")))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                // Not UTF-8; hand back something the caller will reject as malformed.
                log::warn!("Stored value for '{}' is not valid UTF-8", key);
                Ok(Some(String::new()))
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        self.write_bytes(&path, value.as_bytes()).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.set("currentUser", r#"{"email":"a@b.com"}"#).await.unwrap();
        let data = storage.get("currentUser").await.unwrap();
        assert_eq!(data.as_deref(), Some(r#"{"email":"a@b.com"}"#));
        assert!(tmp.path().join("currentUser.json").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert!(storage.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested/dir"));

        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.set("../escape", "v").await.is_err());
        assert!(storage.get("").await.is_err());
    }
}
