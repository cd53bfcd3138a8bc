//! Error types for extraction operations with attempt history tracking.

use std::time::Duration;
use thiserror::Error;

/// How a single model attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Content decoded as JSON (and passed schema validation when enabled).
    Succeeded,
    /// The model answered but the content was not usable JSON.
    DecodeFailed {
        /// What went wrong while decoding.
        message: String,
    },
    /// The remote call itself failed.
    TransportFailed {
        /// Error reported by the dispatcher.
        message: String,
    },
}

impl AttemptOutcome {
    /// Short classification label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::TransportFailed { .. } => "transport_failed",
        }
    }

    /// Whether this attempt ended the extraction successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Record of a single extraction attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// The attempt number (1-indexed).
    pub attempt_number: usize,
    /// Model used for this attempt.
    pub model: String,
    /// Outcome classification.
    pub outcome: AttemptOutcome,
    /// Raw model output, when the call returned any.
    pub raw_content: Option<String>,
    /// Elapsed time since the extraction started, at the end of this attempt.
    pub elapsed: Duration,
}

/// Errors raised before or instead of any model attempt.
///
/// Model-call and decode problems are never raised; they come back inside
/// [`ExtractionResult`](super::ExtractionResult).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The user template or the messages configuration is malformed.
    #[error("Template error: {0}")]
    Template(String),

    /// A settings file could not be read or parsed.
    #[error("Settings error: {0}")]
    Settings(String),
}
