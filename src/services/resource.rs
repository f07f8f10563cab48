// src/services/resource.rs

//! Generic CRUD client shared by every resource.
//!
//! A [`Resource`] names its collection; [`ResourceClient`] issues the
//! list/create/update/delete/transition calls against the conventional
//! routes:
//!
//! | Operation  | Route                         |
//! |------------|-------------------------------|
//! | list       | `GET /{C}/`                   |
//! | create     | `POST /{C}/add`               |
//! | update     | `PUT /{C}/{id}`               |
//! | delete     | `DELETE /{C}/{id}`            |
//! | transition | `PUT /{C}/{id}/{action}`      |

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};

/// A server-owned record addressable by a stable id.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path segment, e.g. `Books`
    const COLLECTION: &'static str;

    /// Human-readable singular name for messages
    const LABEL: &'static str;

    /// Stable identifier, if the server assigned one.
    fn id(&self) -> Option<&str>;

    /// Record the server-assigned identifier on a freshly created item.
    fn set_id(&mut self, id: String);

    /// Field checks run before any create or update is sent.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn list_path() -> String {
        format!("/{}/", Self::COLLECTION)
    }

    fn create_path() -> String {
        format!("/{}/add", Self::COLLECTION)
    }

    fn item_path(id: &str) -> String {
        format!("/{}/{}", Self::COLLECTION, segment(id))
    }
}

/// What a successful create told us.
#[derive(Debug, Clone, PartialEq)]
pub enum Created<R> {
    /// The server echoed the full record
    Record(R),
    /// The server returned only the new id
    Id(String),
    /// The server acknowledged without details
    Acknowledged,
}

/// Typed CRUD client for one resource.
pub struct ResourceClient<R: Resource> {
    api: ApiClient,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _marker: PhantomData,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fetch the whole collection.
    pub async fn fetch_all(&self) -> Result<Vec<R>> {
        self.fetch(ApiRequest::get(R::list_path())).await
    }

    /// Fetch the collection filtered by query parameters.
    pub async fn fetch_where(&self, query: &[(&str, &str)]) -> Result<Vec<R>> {
        let request = query
            .iter()
            .fold(ApiRequest::get(R::list_path()), |req, (k, v)| req.query(*k, *v));
        self.fetch(request).await
    }

    /// Fetch a list from a non-standard route.
    pub async fn fetch_at(&self, path: impl Into<String>) -> Result<Vec<R>> {
        self.fetch(ApiRequest::get(path)).await
    }

    /// Fetch with an arbitrary request.
    pub async fn fetch(&self, request: ApiRequest) -> Result<Vec<R>> {
        let items: Vec<R> = self.api.list(request).await?;
        log::debug!("Fetched {} {} record(s)", items.len(), R::LABEL);
        Ok(items)
    }

    /// Create a record.
    pub async fn create(&self, item: &R) -> Result<Created<R>> {
        item.validate()?;
        let request = ApiRequest::post(R::create_path()).json(item)?;
        let envelope = self.api.envelope::<serde_json::Value>(request).await?;

        let created = match envelope.data {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Created::Id(id),
            Some(value @ serde_json::Value::Object(_)) => match serde_json::from_value::<R>(value) {
                Ok(record) => Created::Record(record),
                Err(e) => {
                    log::debug!("Created {} echo did not parse: {}", R::LABEL, e);
                    Created::Acknowledged
                }
            },
            _ => Created::Acknowledged,
        };
        log::info!("Created {}", R::LABEL);
        Ok(created)
    }

    /// Replace a record by its id.
    pub async fn update(&self, item: &R) -> Result<()> {
        let id = Self::require_id(item)?;
        item.validate()?;
        let request = ApiRequest::put(R::item_path(id)).json(item)?;
        self.api.ack(request).await?;
        log::info!("Updated {} {}", R::LABEL, id);
        Ok(())
    }

    /// Delete a record by id.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(AppError::MissingId(R::LABEL));
        }
        self.api.ack(ApiRequest::delete(R::item_path(id))).await?;
        log::info!("Deleted {} {}", R::LABEL, id);
        Ok(())
    }

    /// Apply a named state transition, e.g. `activate` or `read`.
    pub async fn transition(&self, id: &str, action: &str) -> Result<Option<String>> {
        if id.trim().is_empty() {
            return Err(AppError::MissingId(R::LABEL));
        }
        let path = format!("{}/{}", R::item_path(id), segment(action));
        let message = self.api.ack(ApiRequest::put(path)).await?;
        log::info!("{} {} -> {}", R::LABEL, id, action);
        Ok(message)
    }

    fn require_id(item: &R) -> Result<&str> {
        item.id()
            .filter(|id| !id.trim().is_empty())
            .ok_or(AppError::MissingId(R::LABEL))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::FakeTransport;
    use serde::Deserialize;
    use std::sync::Arc;

    /// Minimal resource used across service tests.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Widget {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<String>,
        pub name: String,
    }

    impl Widget {
        pub(crate) fn new(id: Option<&str>, name: &str) -> Self {
            Self {
                id: id.map(str::to_string),
                name: name.to_string(),
            }
        }
    }

    impl Resource for Widget {
        const COLLECTION: &'static str = "Widgets";
        const LABEL: &'static str = "widget";

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    fn setup() -> (Arc<FakeTransport>, ResourceClient<Widget>) {
        let fake = Arc::new(FakeTransport::new());
        let client = ResourceClient::new(ApiClient::new(fake.clone()));
        (fake, client)
    }

    #[tokio::test]
    async fn test_fetch_all_uses_list_route() {
        let (fake, client) = setup();
        fake.on(
            Method::Get,
            "/Widgets/",
            200,
            r#"{"success":true,"data":[{"id":"w1","name":"a"}]}"#,
        );

        let items = client.fetch_all().await.unwrap();
        assert_eq!(items, vec![Widget::new(Some("w1"), "a")]);
    }

    #[tokio::test]
    async fn test_fetch_where_adds_query() {
        let (fake, client) = setup();
        fake.respond(200, r#"{"success":true,"data":[]}"#);

        client.fetch_where(&[("userId", "u1")]).await.unwrap();
        let req = fake.last_request().unwrap();
        assert_eq!(req.path, "/Widgets/");
        assert_eq!(req.query, vec![("userId".to_string(), "u1".to_string())]);
    }

    #[tokio::test]
    async fn test_create_variants() {
        let (fake, client) = setup();
        fake.respond(201, r#"{"success":true,"data":"w9"}"#);
        fake.respond(200, r#"{"success":true,"data":{"id":"w8","name":"b"}}"#);
        fake.respond(200, r#"{"success":true,"message":"ok"}"#);

        let item = Widget::new(None, "b");
        assert_eq!(client.create(&item).await.unwrap(), Created::Id("w9".into()));
        assert_eq!(
            client.create(&item).await.unwrap(),
            Created::Record(Widget::new(Some("w8"), "b"))
        );
        assert_eq!(client.create(&item).await.unwrap(), Created::Acknowledged);

        let req = fake.last_request().unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/Widgets/add");
        assert_eq!(req.body.unwrap()["name"], "b");
    }

    #[tokio::test]
    async fn test_update_without_id_sends_nothing() {
        let (fake, client) = setup();

        let err = client.update(&Widget::new(None, "x")).await.unwrap_err();
        assert!(matches!(err, AppError::MissingId("widget")));
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_and_transition_routes() {
        let (fake, client) = setup();
        fake.respond(200, r#"{"success":true}"#);
        fake.respond(200, r#"{"success":true,"message":"done"}"#);

        client.delete("w 1").await.unwrap();
        assert_eq!(fake.last_request().unwrap().path, "/Widgets/w%201");

        let message = client.transition("w1", "activate").await.unwrap();
        assert_eq!(message.as_deref(), Some("done"));
        let req = fake.last_request().unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path, "/Widgets/w1/activate");
    }
}
