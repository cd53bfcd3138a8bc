//! Result envelope returned by every extraction call.

use serde_json::{json, Value};

use super::error::AttemptRecord;
use super::metrics::ExtractionMetrics;

/// Outcome of one `extract` call.
///
/// Callers branch on the variant; the failure variants are ordinary values,
/// not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// The model produced valid JSON.
    Success {
        /// Decoded value.
        content: Value,
    },
    /// Every candidate answered, the last answer was not valid JSON.
    DecodeFailure {
        /// Raw text of the last answer.
        raw_content: String,
        /// Explanation including the model name.
        message: String,
    },
    /// The last call failed but an earlier attempt had produced text.
    TransportFailureWithContent {
        /// Most recent raw text seen across attempts.
        raw_content: String,
        /// Explanation including the model name and the last error.
        message: String,
    },
    /// No candidate produced any content.
    TransportFailure {
        /// Explanation including the models tried and the last error.
        message: String,
    },
}

impl ExtractionResult {
    /// Numeric status of the envelope: `0`, `-1`, `-2` or `-3`.
    #[must_use]
    pub const fn status_code(&self) -> i8 {
        match self {
            Self::Success { .. } => 0,
            Self::DecodeFailure { .. } => -1,
            Self::TransportFailureWithContent { .. } => -2,
            Self::TransportFailure { .. } => -3,
        }
    }

    /// Whether the content is decoded JSON.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Decoded JSON, for successful extractions.
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        match self {
            Self::Success { content } => Some(content),
            _ => None,
        }
    }

    /// Raw text carried by the failure variants that have any.
    #[must_use]
    pub fn raw_content(&self) -> Option<&str> {
        match self {
            Self::DecodeFailure { raw_content, .. }
            | Self::TransportFailureWithContent { raw_content, .. } => Some(raw_content),
            Self::Success { .. } | Self::TransportFailure { .. } => None,
        }
    }

    /// Content as a JSON value: the decoded object, the raw string, or null.
    #[must_use]
    pub fn content(&self) -> Value {
        match self {
            Self::Success { content } => content.clone(),
            Self::DecodeFailure { raw_content, .. }
            | Self::TransportFailureWithContent { raw_content, .. } => {
                Value::String(raw_content.clone())
            }
            Self::TransportFailure { .. } => Value::Null,
        }
    }

    /// Diagnostic message of the failure variants.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::DecodeFailure { message, .. }
            | Self::TransportFailureWithContent { message, .. }
            | Self::TransportFailure { message } => Some(message),
        }
    }

    /// Status envelope:
    /// `{"status", "json_type", "content", "error_message"}`.
    /// `error_message` is omitted on success.
    #[must_use]
    pub fn to_envelope(&self) -> Value {
        let mut envelope = json!({
            "status": self.status_code(),
            "json_type": self.is_json(),
            "content": self.content(),
        });
        if let (Some(message), Some(object)) = (self.error_message(), envelope.as_object_mut()) {
            object.insert("error_message".to_string(), Value::String(message.to_string()));
        }
        envelope
    }
}

/// Result plus the per-attempt trail and metrics of one extraction.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// The tagged outcome.
    pub result: ExtractionResult,
    /// One record per attempted model, in order.
    pub history: Vec<AttemptRecord>,
    /// Token and timing metrics across all attempts.
    pub metrics: ExtractionMetrics,
}
