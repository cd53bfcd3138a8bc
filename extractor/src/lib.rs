//! Structured information extraction over OpenAI-compatible chat APIs.
//!
//! Free text goes in, JSON comes out. Each call composes a `[system, user]`
//! conversation from a template, sends it with a structured-output
//! constraint, and falls back to a second model once when the first one
//! errors or answers with something that is not JSON.
//!
//! ```no_run
//! # use openai_extractor::prelude::*;
//! # async fn example() -> Result<(), ExtractionError> {
//! let extractor = ExtractorSettings::from_path("settings.json")?
//!     .into_builder(std::env::var("OPENAI_API_KEY").unwrap_or_default())?
//!     .build()?;
//!
//! match extractor.extract("Entered the brig Esperanza, from Cádiz.").await? {
//!     ExtractionResult::Success { content } => println!("{content}"),
//!     other => eprintln!("{}", other.error_message().unwrap_or_default()),
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

/// Chat-completion transport and dispatcher variants.
pub mod dispatch;
/// Composer, configuration and the fallback controller.
pub mod extraction;
/// Provider hint and endpoint resolution.
pub mod provider;
/// JSON settings files.
pub mod settings;

/// Common imports for extractor usage.
pub mod prelude {
    pub use crate::dispatch::{ChatDispatcher, ChatTurn, DispatchError};
    pub use crate::extraction::{
        ExtractionConfig, ExtractionError, ExtractionReport, ExtractionResult, FieldDefinition,
        InfoExtractor, InfoExtractorBuilder, MessagesConfig, ResponseFormat,
    };
    pub use crate::provider::{resolve_provider, ProviderKind};
    pub use crate::settings::ExtractorSettings;
}
