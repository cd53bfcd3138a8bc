//! Plain chat-completion dispatcher (OpenAI `chat.completions.create`).

use async_trait::async_trait;

use super::client::ChatClient;
use super::error::DispatchError;
use super::types::{ChatRequest, CompletionBody, RawResponse};
use super::ChatDispatcher;

/// Sends the request as-is and returns the first choice's text.
#[derive(Debug, Clone)]
pub struct CompletionDispatcher {
    client: ChatClient,
}

impl CompletionDispatcher {
    /// Wraps a configured client.
    #[must_use]
    pub const fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatDispatcher for CompletionDispatcher {
    async fn dispatch(&self, request: &ChatRequest<'_>) -> Result<RawResponse, DispatchError> {
        let body = self.client.complete(request).await?;
        first_choice(body, request.model)
    }
}

/// Pulls the first choice's content out of a completion body.
pub(crate) fn first_choice(body: CompletionBody, requested: &str) -> Result<RawResponse, DispatchError> {
    let model = body.model.unwrap_or_else(|| requested.to_string());
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DispatchError::InvalidResponse(format!("no choices returned by model {model}")))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| DispatchError::EmptyContent(model.clone()))?;

    Ok(RawResponse {
        model,
        content,
        finish_reason: choice.finish_reason,
        usage: body.usage,
    })
}
