//! Parse-style dispatcher (OpenAI `beta.chat.completions.parse`).
//!
//! Same wire call as [`CompletionDispatcher`](super::CompletionDispatcher), but
//! the structured-output path rejects responses that cannot hold a complete
//! object: token-limit truncation, content-filter stops and refusals. This is
//! the variant bound to the Gemini OpenAI-compatibility endpoint.

use async_trait::async_trait;

use super::client::ChatClient;
use super::completion::first_choice;
use super::error::DispatchError;
use super::types::{ChatRequest, RawResponse};
use super::ChatDispatcher;

/// Structured-output dispatcher.
#[derive(Debug, Clone)]
pub struct ParseDispatcher {
    client: ChatClient,
}

impl ParseDispatcher {
    /// Wraps a configured client.
    #[must_use]
    pub const fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatDispatcher for ParseDispatcher {
    async fn dispatch(&self, request: &ChatRequest<'_>) -> Result<RawResponse, DispatchError> {
        let body = self.client.complete(request).await?;
        let model = body
            .model
            .clone()
            .unwrap_or_else(|| request.model.to_string());

        if let Some(choice) = body.choices.first() {
            match choice.finish_reason.as_deref() {
                Some("length") => return Err(DispatchError::Truncated(model)),
                Some("content_filter") => return Err(DispatchError::ContentFiltered(model)),
                _ => {}
            }
            if let Some(refusal) = &choice.message.refusal {
                return Err(DispatchError::Refused {
                    model,
                    refusal: refusal.clone(),
                });
            }
        }

        first_choice(body, request.model)
    }
}
