use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::DomainError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai";
const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal subset of the chat-completion response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for OpenRouter's OpenAI-compatible chat-completion endpoint.
///
/// Any OpenAI-compatible server works by pointing `base_url` at it; the
/// completions path is appended.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenRouterClient {
    /// `timeout` of `None` leaves the request unbounded.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, DomainError> {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            DomainError::internal(format!("OpenRouterClient: failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: system,
                },
                ApiMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::upstream(format!("OpenRouterClient: request failed: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                DomainError::upstream(format!("OpenRouterClient: failed to read body: {e}"))
            })?;
        debug!("OpenRouter raw response ({status}): {body}");

        if !status.is_success() {
            warn!("OpenRouterClient: API returned {status}");
            return Err(DomainError::upstream(format!(
                "OpenRouterClient: API returned {status}"
            )));
        }

        let api_response: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            DomainError::upstream(format!("OpenRouterClient: failed to parse response: {e}"))
        })?;

        Ok(api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
