//! One-stop builder wiring credentials, provider resolution and configuration
//! into an [`InfoExtractor`].

use std::time::Duration;

use serde_json::{Map, Value};

use super::config::{ExtractionConfigBuilder, FieldDefinition, MessagesConfig};
use super::error::ExtractionError;
use super::format::ResponseFormat;
use super::orchestrator::InfoExtractor;
use crate::dispatch::{ApiKey, ChatClient, ClientConfig};
use crate::provider::resolve_provider;

/// Builder for [`InfoExtractor`].
///
/// ```no_run
/// # use openai_extractor::prelude::*;
/// # fn example() -> Result<(), ExtractionError> {
/// let extractor = InfoExtractorBuilder::new()
///     .with_api_key("sk-...")
///     .with_model("gpt-4o-mini")
///     .with_response_format(ResponseFormat::json_object())
///     .with_messages(MessagesConfig::new(
///         ChatTurn::system("You extract ship arrivals."),
///         "Return {json_template} for: {input_text}",
///     ))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InfoExtractorBuilder {
    api_key: Option<ApiKey>,
    base_url: Option<String>,
    provider: Option<String>,
    fallback_model: Option<Option<String>>,
    client: ClientConfig,
    config: ExtractionConfigBuilder,
}

impl InfoExtractorBuilder {
    /// Starts an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(api_key));
        self
    }

    /// Overrides the endpoint root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the provider hint (`openai...`, `gemini...`).
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the primary model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config = self.config.with_model(model);
        self
    }

    /// Chooses the fallback model explicitly; `None` disables fallback.
    /// Without this call the provider default applies.
    #[must_use]
    pub fn with_fallback_model(mut self, model: Option<String>) -> Self {
        self.fallback_model = Some(model);
        self
    }

    /// Sets the structured-output constraint.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.config = self.config.with_response_format(format);
        self
    }

    /// Sets provider call options.
    #[must_use]
    pub fn with_model_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.config = self.config.with_model_parameters(parameters);
        self
    }

    /// Sets the field glossary.
    #[must_use]
    pub fn with_field_definitions(mut self, definitions: Vec<FieldDefinition>) -> Self {
        self.config = self.config.with_field_definitions(definitions);
        self
    }

    /// Sets the message templates.
    #[must_use]
    pub fn with_messages(mut self, messages: MessagesConfig) -> Self {
        self.config = self.config.with_messages(messages);
        self
    }

    /// Sets the example JSON output.
    #[must_use]
    pub fn with_json_template(mut self, template: Value) -> Self {
        self.config = self.config.with_json_template(template);
        self
    }

    /// Sets the worked examples.
    #[must_use]
    pub fn with_examples(mut self, examples: impl Into<String>) -> Self {
        self.config = self.config.with_examples(examples);
        self
    }

    /// Validates decoded output against the response schema.
    #[must_use]
    pub fn with_schema_validation(mut self, enabled: bool) -> Self {
        self.config = self.config.with_schema_validation(enabled);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Resolves the provider, validates the configuration and binds the
    /// dispatcher.
    pub fn build(self) -> Result<InfoExtractor, ExtractionError> {
        let api_key = self
            .api_key
            .filter(|key| !key.expose().trim().is_empty())
            .ok_or_else(|| ExtractionError::Configuration("API key is not set".to_string()))?;

        let provider = resolve_provider(self.provider.as_deref(), self.base_url.as_deref());

        let fallback_model = self
            .fallback_model
            .unwrap_or_else(|| provider.kind.default_fallback_model().map(str::to_string));
        let config = self.config.with_fallback_model(fallback_model).build()?;

        let client = ChatClient::new(provider.base_url, api_key, &self.client)
            .map_err(|e| ExtractionError::Configuration(format!("could not create HTTP client: {e}")))?;

        Ok(InfoExtractor::new(config, provider.kind.dispatcher(client)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dispatch::ChatTurn;

    fn complete() -> InfoExtractorBuilder {
        InfoExtractorBuilder::new()
            .with_api_key("sk-test")
            .with_model("gpt-4o-mini")
            .with_response_format(ResponseFormat::json_object())
            .with_messages(MessagesConfig::new(ChatTurn::system("s"), "{input_text}"))
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = InfoExtractorBuilder::new()
            .with_model("gpt-4o-mini")
            .with_response_format(ResponseFormat::json_object())
            .with_messages(MessagesConfig::new(ChatTurn::system("s"), "t"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(m) if m.contains("API key")));
    }

    #[test]
    fn test_openai_gets_default_fallback() {
        let extractor = complete().build().unwrap();
        assert_eq!(extractor.config().fallback_model(), Some("gpt-4o"));
    }

    #[test]
    fn test_gemini_has_no_default_fallback() {
        let extractor = complete()
            .with_provider("gemini")
            .with_model("gemini-2.0-flash")
            .build()
            .unwrap();
        assert_eq!(extractor.config().fallback_model(), None);
        assert_eq!(extractor.config().candidate_models(), vec!["gemini-2.0-flash"]);
    }

    #[test]
    fn test_explicit_fallback_overrides_default() {
        let none = complete().with_fallback_model(None).build().unwrap();
        assert_eq!(none.config().fallback_model(), None);

        let chosen = complete()
            .with_fallback_model(Some("gpt-4.1".to_string()))
            .build()
            .unwrap();
        assert_eq!(chosen.config().candidate_models(), vec!["gpt-4o-mini", "gpt-4.1"]);
    }

    #[test]
    fn test_incomplete_config_is_rejected() {
        let err = InfoExtractorBuilder::new()
            .with_api_key("k")
            .with_model("m")
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(_)));
    }
}
