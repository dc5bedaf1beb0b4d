use async_trait::async_trait;
use tracing::warn;

use crate::application::RelayClient;
use crate::domain::{DomainError, RelayRequest, RelayResponse};

const CHAT_PATH: &str = "/api/chat";
pub const DEFAULT_RELAY_URL: &str = "http://localhost:8080";

/// Talks to a running relay over HTTP. Any non-2xx status is an error.
pub struct HttpRelayClient {
    client: reqwest::Client,
    url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base.trim_end_matches('/'), CHAT_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<RelayResponse, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                DomainError::upstream(format!("HttpRelayClient: request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("HttpRelayClient: relay returned {status}: {body}");
            return Err(DomainError::upstream(format!(
                "HttpRelayClient: relay returned {status}"
            )));
        }

        response.json().await.map_err(|e| {
            DomainError::upstream(format!("HttpRelayClient: failed to parse response: {e}"))
        })
    }
}
