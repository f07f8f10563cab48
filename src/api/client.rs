//! Envelope-aware API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::{ApiRequest, RawResponse, Transport};
use crate::error::{AppError, Result};
use crate::models::Envelope;

/// Shared handle for issuing backend calls.
///
/// Cheap to clone; every service holds one.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send a request and return the raw response.
    pub async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let description = request.describe();
        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("{} failed: {}", description, e);
            e
        })?;
        Ok(response)
    }

    /// Send a request and unwrap the `{success, message, data}` envelope.
    pub async fn envelope<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<T>> {
        let description = request.describe();
        let response = self.send(request).await?;
        let envelope = Self::parse_envelope(&response)?;

        if !envelope.success {
            let message = envelope
                .describe()
                .unwrap_or_else(|| format!("{description} was not successful"));
            log::warn!("{} rejected: {}", description, message);
            return Err(AppError::server(response.status, message));
        }
        Ok(envelope)
    }

    /// Envelope data, failing if the server sent none.
    pub async fn data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let description = request.describe();
        self.envelope(request).await?.data.ok_or_else(|| {
            AppError::server(200, format!("{description} returned no data"))
        })
    }

    /// Envelope list data; a missing list is empty.
    pub async fn list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>> {
        Ok(self.envelope(request).await?.data.unwrap_or_default())
    }

    /// Envelope acknowledgement; returns the server message, if any.
    pub async fn ack(&self, request: ApiRequest) -> Result<Option<String>> {
        let envelope: Envelope<serde_json::Value> = self.envelope(request).await?;
        Ok(envelope.message)
    }

    /// Plain JSON body without an envelope, for non-conforming endpoints.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(AppError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    fn parse_envelope<T: DeserializeOwned>(response: &RawResponse) -> Result<Envelope<T>> {
        if response.body.trim().is_empty() {
            if response.is_success() {
                return Ok(Envelope::empty_success());
            }
            return Err(AppError::Status {
                status: response.status,
                body: String::new(),
            });
        }

        match serde_json::from_str::<Envelope<T>>(&response.body) {
            Ok(envelope) if response.is_success() || !envelope.success => Ok(envelope),
            // Non-2xx claiming success: trust the status.
            Ok(_) => Err(AppError::Status {
                status: response.status,
                body: response.body.clone(),
            }),
            Err(e) if response.is_success() => Err(AppError::Json(e)),
            Err(_) => Err(Self::non_envelope_failure(response)),
        }
    }

    /// Non-2xx whose body is not a typed envelope: salvage a message if one is there.
    fn non_envelope_failure(response: &RawResponse) -> AppError {
        if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(&response.body) {
            if let Some(message) = envelope.describe() {
                return AppError::server(response.status, message);
            }
        }
        AppError::Status {
            status: response.status,
            body: response.body.clone(),
        }
    }
}
