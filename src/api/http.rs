//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{ApiRequest, Method, RawResponse, Transport};
use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Transport that talks to the real backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a configured asynchronous HTTP transport.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        if !request.path.starts_with('/') {
            return Err(AppError::validation(format!(
                "request path must start with '/': {}",
                request.path
            )));
        }
        url.set_path(&format!("{}{}", base_path, request.path));
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.url_for(&request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        log::debug!("{} -> {}", request.describe(), status);

        Ok(RawResponse { status, body })
    }
}
