//! Request dispatch to OpenAI-compatible chat-completion endpoints.
//!
//! The extraction controller only depends on [`ChatDispatcher`]. Two variants
//! share one HTTP [`ChatClient`]:
//!
//! - [`CompletionDispatcher`] - generic `chat.completions.create` call
//! - [`ParseDispatcher`] - structured-output `parse` call, used for Gemini
//!
//! The variant is chosen once, when the extractor is built
//! (see [`crate::provider`]), never per call.

pub mod client;
pub mod completion;
pub mod error;
pub mod parse;
pub mod types;

use async_trait::async_trait;

pub use client::{ApiKey, ChatClient, ClientConfig};
pub use completion::CompletionDispatcher;
pub use error::DispatchError;
pub use parse::ParseDispatcher;
pub use types::{ChatRequest, ChatTurn, ContentPart, ImageUrl, MessageContent, RawResponse, Role, Usage};

/// Capability to send one chat request to a remote model.
#[async_trait]
pub trait ChatDispatcher: Send + Sync {
    /// Sends `request` and returns the first choice's raw content.
    async fn dispatch(&self, request: &ChatRequest<'_>) -> Result<RawResponse, DispatchError>;
}
