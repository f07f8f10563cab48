// src/shim/directory.rs

//! User directory the shim authenticates against.
//!
//! ```toml
//! [[users]]
//! id = "u1"
//! email = "a@b.com"
//! role = "student"
//! password_hash = "$2b$12$..."
//! is_active = true
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Role;

/// One account in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    /// bcrypt hash
    pub password_hash: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    users: Vec<DirectoryUser>,
}

/// Accounts keyed by lowercased email.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, DirectoryUser>,
}

impl UserDirectory {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let directory = Self::from_toml(&content)?;
        log::info!(
            "Loaded {} user(s) from {}",
            directory.len(),
            path.as_ref().display()
        );
        Ok(directory)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: DirectoryFile = toml::from_str(content)?;
        Ok(Self::from_users(file.users))
    }

    pub fn from_users(users: impl IntoIterator<Item = DirectoryUser>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.email.trim().to_lowercase(), user))
            .collect();
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// The account for these credentials, if they match an active user.
    ///
    /// Unknown email, wrong password and inactive account all yield `None`.
    /// A corrupt stored hash is an error.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<&DirectoryUser>> {
        let Some(user) = self.users.get(&email.trim().to_lowercase()) else {
            return Ok(None);
        };
        if !bcrypt::verify(password, &user.password_hash)? {
            return Ok(None);
        }
        if !user.is_active {
            log::warn!("Refusing inactive account {}", user.email);
            return Ok(None);
        }
        Ok(Some(user))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user(id: &str, email: &str, password: &str, active: bool) -> DirectoryUser {
        DirectoryUser {
            id: id.into(),
            email: email.into(),
            role: Role::Student,
            password_hash: bcrypt::hash(password, 4).unwrap(),
            is_active: active,
        }
    }

    #[test]
    fn test_authenticate() {
        let directory = UserDirectory::from_users([
            user("u1", "a@b.com", "secret", true),
            user("u2", "off@b.com", "secret", false),
        ]);

        assert_eq!(directory.authenticate("A@B.com", "secret").unwrap().unwrap().id, "u1");
        assert!(directory.authenticate("a@b.com", "wrong").unwrap().is_none());
        assert!(directory.authenticate("nobody@b.com", "secret").unwrap().is_none());
        assert!(directory.authenticate("off@b.com", "secret").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_hash_is_error() {
        let mut bad = user("u1", "a@b.com", "secret", true);
        bad.password_hash = "plaintext".into();
        let directory = UserDirectory::from_users([bad]);

        assert!(directory.authenticate("a@b.com", "plaintext").is_err());
    }

    #[test]
    fn test_from_toml() {
        let hash = bcrypt::hash("pw", 4).unwrap();
        let content = format!(
            "[[users]]\nid = \"u1\"\nemail = \"t@school.edu\"\nrole = \"teacher\"\npassword_hash = \"{hash}\"\n"
        );

        let directory = UserDirectory::from_toml(&content).unwrap();
        assert_eq!(directory.len(), 1);
        let found = directory.authenticate("t@school.edu", "pw").unwrap().unwrap();
        assert_eq!(found.role, Role::Teacher);
        assert!(found.is_active);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("users.toml");
        fs::write(&path, "").unwrap();

        assert!(UserDirectory::load(&path).unwrap().is_empty());
        assert!(UserDirectory::load(tmp.path().join("missing.toml")).is_err());
    }
}
