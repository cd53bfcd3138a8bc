//! HTTP client for OpenAI-compatible `/chat/completions` endpoints.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

use super::error::DispatchError;
use super::types::{ChatRequest, CompletionBody};

/// API credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Transport settings for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout enforced by the HTTP client.
    ///
    /// Default: 120 seconds
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

impl ClientConfig {
    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin client bound to one endpoint and one credential.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl ChatClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        api_key: ApiKey,
        config: &ClientConfig,
    ) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Endpoint root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Posts one chat-completion request and decodes the body.
    pub async fn complete(&self, request: &ChatRequest<'_>) -> Result<CompletionBody, DispatchError> {
        let body = request
            .to_body()
            .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;

        tracing::debug!(
            event = "chat_request",
            model = request.model,
            messages = request.messages.len(),
            structured = request.response_format.is_some(),
            "chat_request"
        );

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, text, request.model));
        }

        let text = response.text().await?;
        serde_json::from_str::<CompletionBody>(&text)
            .map_err(|e| DispatchError::InvalidResponse(e.to_string()))
    }
}

fn status_error(status: StatusCode, body: String, model: &str) -> DispatchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DispatchError::Authentication {
            status: status.as_u16(),
            body,
        },
        StatusCode::TOO_MANY_REQUESTS => DispatchError::RateLimited(body),
        StatusCode::NOT_FOUND => DispatchError::ModelNotFound(model.to_string()),
        _ => DispatchError::Status {
            status: status.as_u16(),
            body,
        },
    }
}
