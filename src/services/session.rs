// src/services/session.rs

//! Session authority: the single owner of "who is signed in".
//!
//! Reads go through [`SessionAuthority::current`] or a watch receiver.
//! Only [`establish`](SessionAuthority::establish) and
//! [`clear`](SessionAuthority::clear) change the session, and only they
//! touch persistent storage.

use std::sync::{Arc, Mutex};

use regex::Regex;
use tokio::sync::watch;

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, DEACTIVATED_MESSAGE, LOGIN_FAILED_MESSAGE, Result};
use crate::models::{Session, VerifiedUser};
use crate::storage::{KeyValueStore, SESSION_KEY};

/// Shared session state with persistence.
pub struct SessionAuthority {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    current: watch::Sender<Option<Session>>,
    last_error: Mutex<Option<String>>,
}

impl SessionAuthority {
    /// Start from whatever session was persisted.
    ///
    /// Malformed persisted data is discarded and the authority starts
    /// anonymous; this never fails.
    pub async fn restore(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let restored = Self::read_persisted(store.as_ref()).await;
        let (current, _) = watch::channel(restored);
        Self {
            api,
            store,
            current,
            last_error: Mutex::new(None),
        }
    }

    async fn read_persisted(store: &dyn KeyValueStore) -> Option<Session> {
        let raw = match store.get(SESSION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read persisted session: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                log::debug!("Restored session for {}", session.email);
                Some(session)
            }
            Err(e) => {
                log::warn!("Discarding malformed persisted session: {}", e);
                if let Err(e) = store.remove(SESSION_KEY).await {
                    log::warn!("Could not remove malformed session: {}", e);
                }
                None
            }
        }
    }

    /// The signed-in session, if any.
    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// The signed-in session or `NotSignedIn`.
    pub fn require(&self) -> Result<Session> {
        self.current().ok_or(AppError::NotSignedIn)
    }

    /// Message from the last failed login, for display.
    pub fn last_error(&self) -> Option<String> {
        self.lock_error().clone()
    }

    fn lock_error(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.last_error.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_error(&self, message: Option<String>) {
        *self.lock_error() = message;
    }

    /// Verify credentials against the backend and establish the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        self.set_error(None);

        let email = email.trim();
        if let Err(e) = validate_credentials(email, password) {
            self.set_error(Some(e.display_message()));
            return Err(e);
        }

        let request = ApiRequest::post("/auth/verify")
            .query("email", email)
            .query("password", password);

        let verified: VerifiedUser = match self.api.json(request).await {
            Ok(user) => user,
            Err(e) => {
                let e = classify_login_failure(e);
                self.set_error(Some(e.display_message()));
                return Err(e);
            }
        };

        let session = Session::from(verified);
        if let Err(e) = self.establish(session.clone()).await {
            log::warn!("Could not persist session for {}: {}", session.email, e);
            self.set_error(Some(e.display_message()));
            return Err(e);
        }
        log::info!("Signed in as {} ({})", session.email, session.role);
        Ok(session)
    }

    /// Sign out. Memory is cleared first, then the persisted key, with no server call.
    pub async fn logout(&self) -> Result<()> {
        self.clear().await?;
        log::info!("Signed out");
        Ok(())
    }

    /// Replace the session in storage, then in memory. Memory is untouched if the write fails.
    pub async fn establish(&self, session: Session) -> Result<()> {
        let json = serde_json::to_string(&session)?;
        self.store.set(SESSION_KEY, &json).await?;
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Drop the session from memory and storage, whatever the prior state.
    pub async fn clear(&self) -> Result<()> {
        self.current.send_replace(None);
        self.set_error(None);
        self.store.remove(SESSION_KEY).await
    }

    /// Re-read storage; an externally removed or corrupted key signs out.
    pub async fn sync(&self) -> Option<Session> {
        let persisted = Self::read_persisted(self.store.as_ref()).await;
        if persisted != self.current() {
            log::debug!("Session changed in storage");
            self.current.send_replace(persisted.clone());
        }
        persisted
    }

    /// The signed-in user's backend id, looking it up by email when unknown.
    pub async fn ensure_id(&self) -> Result<String> {
        let session = self.require()?;
        if let Some(id) = session.derived_id.as_deref().filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }

        let path = format!("/Users/id/email/{}", segment(&session.email));
        let id: String = self.api.data(ApiRequest::get(path)).await?;
        if id.trim().is_empty() {
            return Err(AppError::server(200, "User id lookup returned an empty id"));
        }

        // Only attach the id if the same user is still signed in.
        if self.current().as_ref().map(|s| &s.email) == Some(&session.email) {
            self.establish(session.with_id(id.clone())).await?;
        }
        Ok(id)
    }

    /// Reflect a server-side email change in the session.
    pub async fn update_email(&self, new_email: &str) -> Result<Session> {
        let mut session = self.require()?;
        session.email = new_email.trim().to_string();
        self.establish(session.clone()).await?;
        Ok(session)
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Reject obviously bad input before any request is sent.
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() {
        return Err(AppError::validation("Email is required."));
    }
    if email_pattern().is_some_and(|re| !re.is_match(email)) {
        return Err(AppError::validation("Please enter a valid email address."));
    }
    if password.is_empty() {
        return Err(AppError::validation("Password is required."));
    }
    Ok(())
}

/// 403 means deactivated; every other failure reads the same to the user.
fn classify_login_failure(error: AppError) -> AppError {
    match error {
        AppError::Status { status: 403, .. } | AppError::Server { status: 403, .. } => {
            log::warn!("Login refused: {}", DEACTIVATED_MESSAGE);
            AppError::AccountDeactivated
        }
        other => {
            log::warn!("Login failed: {}", other);
            let status = match &other {
                AppError::Status { status, .. } | AppError::Server { status, .. } => *status,
                _ => 0,
            };
            AppError::server(status, LOGIN_FAILED_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::FakeTransport;
    use crate::models::Role;
    use crate::storage::{LocalStorage, MemoryStorage};

    async fn authority(
        store: Arc<dyn KeyValueStore>,
    ) -> (Arc<FakeTransport>, SessionAuthority) {
        let fake = Arc::new(FakeTransport::new());
        let auth = SessionAuthority::restore(ApiClient::new(fake.clone()), store).await;
        (fake, auth)
    }

    #[tokio::test]
    async fn test_login_establishes_and_persists() {
        let store = Arc::new(MemoryStorage::new());
        let (fake, auth) = authority(store.clone()).await;
        fake.on(
            Method::Post,
            "/auth/verify",
            200,
            r#"{"email":"a@b.com","role":"student"}"#,
        );

        let session = auth.login("a@b.com", "pw").await.unwrap();
        assert_eq!(session, Session::new("a@b.com", Role::Student));
        assert_eq!(auth.current(), Some(session));

        let persisted = store.get(SESSION_KEY).await.unwrap().unwrap();
        assert_eq!(persisted, r#"{"email":"a@b.com","role":"student"}"#);

        let req = fake.last_request().unwrap();
        assert!(req.query.contains(&("email".into(), "a@b.com".into())));
        assert!(req.query.contains(&("password".into(), "pw".into())));
    }

    /// Reads nothing and refuses every write.
    struct ReadOnlyStore;

    #[async_trait::async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::Io(std::io::Error::other("disk full")))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_user_signed_out() {
        let (fake, auth) = authority(Arc::new(ReadOnlyStore)).await;
        fake.on(
            Method::Post,
            "/auth/verify",
            200,
            r#"{"email":"a@b.com","role":"student"}"#,
        );

        assert!(auth.login("a@b.com", "pw").await.is_err());
        assert_eq!(auth.current(), None);
        assert!(!auth.is_signed_in());
        assert!(auth.last_error().is_some());
    }

    #[tokio::test]
    async fn test_deactivated_account_message() {
        let store = Arc::new(MemoryStorage::new());
        let (fake, auth) = authority(store.clone()).await;
        fake.on(Method::Post, "/auth/verify", 403, "User account is disabled.");

        let err = auth.login("a@b.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::AccountDeactivated));
        assert_eq!(auth.last_error().as_deref(), Some(DEACTIVATED_MESSAGE));
        assert!(auth.current().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_failures_use_generic_message() {
        let (fake, auth) = authority(Arc::new(MemoryStorage::new())).await;
        fake.on(Method::Post, "/auth/verify", 404, "User not found.");

        auth.login("a@b.com", "pw").await.unwrap_err();
        assert_eq!(auth.last_error().as_deref(), Some(LOGIN_FAILED_MESSAGE));

        let (fake, auth) = authority(Arc::new(MemoryStorage::new())).await;
        fake.offline();
        auth.login("a@b.com", "pw").await.unwrap_err();
        assert_eq!(auth.last_error().as_deref(), Some(LOGIN_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_empty_email_sends_nothing() {
        let (fake, auth) = authority(Arc::new(MemoryStorage::new())).await;

        let err = auth.login("   ", "pw").await.unwrap_err();
        assert!(err.is_local());
        assert_eq!(auth.last_error().as_deref(), Some("Email is required."));
        assert_eq!(fake.request_count(), 0);

        assert!(auth.login("not-an-email", "pw").await.is_err());
        assert!(auth.login("a@b.com", "").await.is_err());
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = Arc::new(MemoryStorage::new());
        let (_fake, auth) = authority(store.clone()).await;
        auth.establish(Session::new("a@b.com", Role::Admin)).await.unwrap();

        auth.logout().await.unwrap();
        assert!(auth.current().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());

        // Already anonymous: still fine.
        auth.logout().await.unwrap();
        assert!(auth.current().is_none());
    }

    #[tokio::test]
    async fn test_restore_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = Arc::new(LocalStorage::new(tmp.path()));
        store
            .set(SESSION_KEY, r#"{"email":"t@school.edu","role":"teacher","id":"u7"}"#)
            .await
            .unwrap();

        let (_fake, auth) = authority(store).await;
        let session = auth.current().unwrap();
        assert_eq!(session.role, Role::Teacher);
        assert_eq!(session.derived_id.as_deref(), Some("u7"));
    }

    #[tokio::test]
    async fn test_malformed_persisted_session_is_anonymous() {
        let store = Arc::new(MemoryStorage::new());
        store.set(SESSION_KEY, "{not json").await.unwrap();

        let (_fake, auth) = authority(store.clone()).await;
        assert!(auth.current().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_after_external_removal() {
        let store = Arc::new(MemoryStorage::new());
        let (_fake, auth) = authority(store.clone()).await;
        auth.establish(Session::new("a@b.com", Role::Student)).await.unwrap();
        let mut rx = auth.subscribe();

        store.remove(SESSION_KEY).await.unwrap();
        assert!(auth.sync().await.is_none());
        assert!(auth.current().is_none());
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_ensure_id_looks_up_and_persists() {
        let store = Arc::new(MemoryStorage::new());
        let (fake, auth) = authority(store.clone()).await;
        auth.establish(Session::new("a@b.com", Role::Student)).await.unwrap();
        fake.on(
            Method::Get,
            "/Users/id/email/a%40b.com",
            200,
            r#"{"success":true,"data":"u42"}"#,
        );

        assert_eq!(auth.ensure_id().await.unwrap(), "u42");
        assert_eq!(auth.current().unwrap().derived_id.as_deref(), Some("u42"));

        // Cached now: no second lookup.
        assert_eq!(auth.ensure_id().await.unwrap(), "u42");
        assert_eq!(fake.request_count(), 1);

        let persisted = store.get(SESSION_KEY).await.unwrap().unwrap();
        assert!(persisted.contains(r#""id":"u42""#));
    }

    #[tokio::test]
    async fn test_ensure_id_requires_session() {
        let (_fake, auth) = authority(Arc::new(MemoryStorage::new())).await;
        assert!(matches!(auth.ensure_id().await, Err(AppError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_update_email() {
        let store = Arc::new(MemoryStorage::new());
        let (_fake, auth) = authority(store.clone()).await;
        auth.establish(Session::new("old@b.com", Role::Student)).await.unwrap();

        auth.update_email("new@b.com").await.unwrap();
        assert_eq!(auth.current().unwrap().email, "new@b.com");
        let persisted = store.get(SESSION_KEY).await.unwrap().unwrap();
        assert!(persisted.contains("new@b.com"));
    }
}
