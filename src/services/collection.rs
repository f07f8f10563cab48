// src/services/collection.rs

//! Local list state for one resource view.
//!
//! A view fetches a collection, keeps it in memory, and reflects mutations
//! either by patching the list in place (optimistic) or by refetching.
//! Failures never escape as panics; they become a displayable error string.

use crate::api::ApiRequest;
use crate::error::{AppError, Result};
use crate::services::cancel::CancelScope;
use crate::services::resource::{Created, Resource, ResourceClient};

/// How a view reflects successful mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Patch the local list from what was sent and returned
    #[default]
    Optimistic,
    /// Refetch the collection; also used to revert after a failure
    Refetch,
}

/// A resource page's view state.
pub struct CollectionView<R: Resource> {
    client: ResourceClient<R>,
    source: ApiRequest,
    items: Vec<R>,
    error: Option<String>,
    policy: RefreshPolicy,
    scope: CancelScope,
}

impl<R: Resource> CollectionView<R> {
    /// View over the full collection.
    pub fn new(client: ResourceClient<R>, policy: RefreshPolicy) -> Self {
        Self::with_source(client, ApiRequest::get(R::list_path()), policy)
    }

    /// View over a custom listing request (filtered or nested route).
    pub fn with_source(client: ResourceClient<R>, source: ApiRequest, policy: RefreshPolicy) -> Self {
        Self {
            client,
            source,
            items: Vec::new(),
            error: None,
            policy,
            scope: CancelScope::new(),
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == Some(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Stop all in-flight and future requests; state is frozen from here on.
    pub fn close(&self) {
        self.scope.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Fetch the collection, replacing the local list on success.
    pub async fn refresh(&mut self) -> Result<()> {
        let result = self
            .scope
            .run(self.client.fetch(self.source.clone()))
            .await;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create a record and reflect it.
    pub async fn add(&mut self, item: R) -> Result<()> {
        let result = self.scope.run(self.client.create(&item)).await;
        match result {
            Ok(created) => {
                if self.policy == RefreshPolicy::Refetch {
                    return self.refresh().await;
                }
                let record = match created {
                    Created::Record(record) => record,
                    Created::Id(id) => {
                        let mut record = item;
                        record.set_id(id);
                        record
                    }
                    Created::Acknowledged => item,
                };
                self.items.push(record);
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail_and_revert(e).await),
        }
    }

    /// Replace a record and reflect it.
    pub async fn update(&mut self, item: R) -> Result<()> {
        let result = self.scope.run(self.client.update(&item)).await;
        match result {
            Ok(()) => {
                if self.policy == RefreshPolicy::Refetch {
                    return self.refresh().await;
                }
                if let Some(slot) = self.items.iter_mut().find(|i| i.id() == item.id()) {
                    *slot = item;
                }
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail_and_revert(e).await),
        }
    }

    /// Delete a record; on success its id no longer appears in `items()`.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        let result = self.scope.run(self.client.delete(id)).await;
        match result {
            Ok(()) => {
                self.items.retain(|item| item.id() != Some(id));
                self.error = None;
                if self.policy == RefreshPolicy::Refetch {
                    self.refresh().await?;
                    // The backend may lag; never show what we just deleted.
                    self.items.retain(|item| item.id() != Some(id));
                }
                Ok(())
            }
            Err(e) => Err(self.fail_and_revert(e).await),
        }
    }

    /// Apply a state transition and patch the local record with `apply`.
    pub async fn transition<F>(&mut self, id: &str, action: &str, apply: F) -> Result<Option<String>>
    where
        F: FnOnce(&mut R),
    {
        let result = self.scope.run(self.client.transition(id, action)).await;
        match result {
            Ok(message) => {
                if self.policy == RefreshPolicy::Refetch {
                    self.refresh().await?;
                } else {
                    if let Some(item) = self.items.iter_mut().find(|i| i.id() == Some(id)) {
                        apply(item);
                    }
                    self.error = None;
                }
                Ok(message)
            }
            Err(e) => Err(self.fail_and_revert(e).await),
        }
    }

    /// Record a failure for display, unless the view is gone.
    fn fail(&mut self, error: AppError) -> AppError {
        if !matches!(error, AppError::Cancelled) {
            log::warn!("{} view: {}", R::LABEL, error);
            self.error = Some(error.display_message());
        }
        error
    }

    async fn fail_and_revert(&mut self, error: AppError) -> AppError {
        let error = self.fail(error);
        if self.policy == RefreshPolicy::Refetch && !error.is_local() && !self.is_closed() {
            let message = self.error.clone();
            // Keep the original failure visible after the revert.
            if self.refresh().await.is_ok() {
                self.error = message;
            }
        }
        error
    }
}
