// src/services/exchanges.rs

//! Book-for-book exchange requests.

use std::collections::HashMap;

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};
use crate::models::{Exchange, ExchangeStatus};
use crate::services::resource::{Resource, ResourceClient};

impl Resource for Exchange {
    const COLLECTION: &'static str = "Exchanges";
    const LABEL: &'static str = "exchange";

    fn id(&self) -> Option<&str> {
        self.exchange_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.exchange_id = Some(id);
    }
}

#[derive(Clone)]
pub struct ExchangeService {
    client: ResourceClient<Exchange>,
}

impl ExchangeService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<Exchange> {
        &self.client
    }

    pub fn for_user_request(user_id: &str) -> ApiRequest {
        ApiRequest::get(format!("/Exchanges/user/{}", segment(user_id)))
    }

    /// Exchanges the user requested or was asked for.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Exchange>> {
        self.client.fetch(Self::for_user_request(user_id)).await
    }

    /// Propose a swap; returns the new exchange id.
    pub async fn request(&self, exchange: &Exchange) -> Result<Exchange> {
        for (field, value) in [
            ("offeredBookId", &exchange.offered_book_id),
            ("requestedBookId", &exchange.requested_book_id),
            ("requesterId", &exchange.requester_id),
            ("ownerId", &exchange.owner_id),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("Missing required field: {field}")));
            }
        }
        if exchange.offered_book_id == exchange.requested_book_id {
            return Err(AppError::validation("A book cannot be exchanged for itself."));
        }

        let request = ApiRequest::post("/Exchanges/request").json(exchange)?;
        let data: HashMap<String, String> = self.client.api().data(request).await?;
        let id = data
            .get("exchangeId")
            .filter(|id| !id.is_empty())
            .cloned()
            .ok_or_else(|| AppError::server(200, "Exchange request returned no id"))?;

        log::info!("Requested exchange {}", id);
        let mut created = exchange.clone();
        created.set_id(id);
        created.status = ExchangeStatus::Pending;
        Ok(created)
    }

    /// Accept or reject a pending exchange.
    pub async fn respond(
        &self,
        exchange_id: &str,
        decision: ExchangeStatus,
        responder_id: &str,
    ) -> Result<Option<String>> {
        if exchange_id.trim().is_empty() {
            return Err(AppError::MissingId(Exchange::LABEL));
        }
        if !matches!(decision, ExchangeStatus::Accepted | ExchangeStatus::Rejected) {
            return Err(AppError::validation("An exchange can only be accepted or rejected."));
        }
        let path = format!("{}/respond", Exchange::item_path(exchange_id));
        let request = ApiRequest::post(path)
            .query("action", decision.as_str())
            .query("responderId", responder_id);
        let message = self.client.api().ack(request).await?;
        log::info!("Exchange {} {}", exchange_id, decision);
        Ok(message)
    }
}
