//! Wire types shared by every chat-completion dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the whole conversation.
    System,
    /// Caller input.
    User,
    /// Model output.
    Assistant,
}

/// A single part of a multi-part message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
    /// An image reference, usually a `data:` URL.
    ImageUrl {
        /// Image location.
        image_url: ImageUrl,
    },
}

/// Location of an image sent to a vision model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// `https://` or `data:<mime>;base64,<payload>` URL.
    pub url: String,
}

/// Body of a chat turn: either a plain string or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text body.
    Text(String),
    /// Mixed text and image parts.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of the body, ignoring images.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who is speaking.
    pub role: Role,
    /// What is said.
    pub content: MessageContent,
}

impl ChatTurn {
    /// A system turn with plain text content.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// A user turn with plain text content.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// A user turn made of several parts.
    #[must_use]
    pub const fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Everything a dispatcher needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Model identifier for this attempt.
    pub model: &'a str,
    /// Conversation, system turn first.
    pub messages: &'a [ChatTurn],
    /// `response_format` value constraining the output, if any.
    pub response_format: Option<&'a Value>,
    /// Provider-specific call options (temperature, `max_tokens`, ...).
    pub parameters: &'a Map<String, Value>,
}

impl ChatRequest<'_> {
    /// Builds the JSON body. Provider parameters go in first so the required
    /// fields always win over a same-named parameter.
    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = self.parameters.clone();
        body.insert("model".to_string(), Value::String(self.model.to_string()));
        body.insert("messages".to_string(), serde_json::to_value(self.messages)?);
        if let Some(format) = self.response_format {
            body.insert("response_format".to_string(), format.clone());
        }
        Ok(Value::Object(body))
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Raw chat-completion body as returned by the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionBody {
    /// Model that served the call.
    #[serde(default)]
    pub model: Option<String>,
    /// Generated choices; only the first is used.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token accounting.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Why generation stopped (`stop`, `length`, `content_filter`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// The assistant message.
    pub message: AssistantMessage,
}

/// Assistant message of a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    /// Text content, absent on refusals and tool calls.
    #[serde(default)]
    pub content: Option<String>,
    /// Refusal text for structured-output calls.
    #[serde(default)]
    pub refusal: Option<String>,
}

/// Response handed back to the extraction controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Model that served the call, as reported by the provider or requested.
    pub model: String,
    /// Unparsed text of the first choice.
    pub content: String,
    /// Finish reason of the first choice.
    pub finish_reason: Option<String>,
    /// Token usage, when reported.
    pub usage: Option<Usage>,
}
