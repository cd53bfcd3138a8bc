//! Structured extraction with model fallback.
//!
//! - [`InfoExtractor`] - fallback-retry controller over a [`ChatDispatcher`](crate::dispatch::ChatDispatcher)
//! - [`InfoExtractorBuilder`] - credentials + provider resolution + configuration
//! - [`ExtractionConfig`] - immutable, validated configuration
//! - [`compose`] - `[system, user]` message composition
//! - [`ExtractionResult`] - tagged outcome envelope
//! - [`ExtractionError`] - configuration and template errors, raised before any call

pub mod builder;
pub mod composer;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod observer;
pub mod orchestrator;
pub mod result;
pub mod template;

pub use builder::InfoExtractorBuilder;
pub use composer::compose;
pub use config::{ExtractionConfig, ExtractionConfigBuilder, FieldDefinition, MessagesConfig};
pub use error::{AttemptOutcome, AttemptRecord, ExtractionError};
pub use format::ResponseFormat;
pub use metrics::{estimate_tokens, ExtractionMetrics};
pub use observer::{AttemptObserver, TracingObserver};
pub use orchestrator::InfoExtractor;
pub use result::{ExtractionReport, ExtractionResult};
