//! Immutable extraction configuration and its validating builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ExtractionError;
use super::format::ResponseFormat;
use crate::dispatch::ChatTurn;

/// One entry of the field glossary shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name as it appears in the JSON template.
    pub name: String,
    /// What the field means.
    pub description: String,
}

impl FieldDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// System turn plus the user-turn template.
///
/// The template may reference `{json_template}`, `{field_definitions}`,
/// `{input_example}` and `{input_text}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Sent unchanged as the first turn.
    pub system: ChatTurn,
    /// Rendered into the second (user) turn.
    pub user_template: String,
}

impl MessagesConfig {
    /// Creates a messages configuration.
    #[must_use]
    pub fn new(system: ChatTurn, user_template: impl Into<String>) -> Self {
        Self {
            system,
            user_template: user_template.into(),
        }
    }
}

/// Read-only configuration of an extractor.
///
/// Only obtainable through [`ExtractionConfigBuilder::build`], which enforces
/// that the primary model, the response format and the message templates are
/// present.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    primary_model: String,
    fallback_model: Option<String>,
    response_format: ResponseFormat,
    field_definitions: Vec<FieldDefinition>,
    json_template: Value,
    examples: String,
    messages: MessagesConfig,
    model_parameters: Map<String, Value>,
    validate_against_schema: bool,
}

impl ExtractionConfig {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// Model tried first.
    #[must_use]
    pub fn primary_model(&self) -> &str {
        &self.primary_model
    }

    /// Model tried after the primary one fails, if any.
    #[must_use]
    pub fn fallback_model(&self) -> Option<&str> {
        self.fallback_model.as_deref()
    }

    /// Structured-output constraint.
    #[must_use]
    pub const fn response_format(&self) -> &ResponseFormat {
        &self.response_format
    }

    /// Field glossary, in insertion order.
    #[must_use]
    pub fn field_definitions(&self) -> &[FieldDefinition] {
        &self.field_definitions
    }

    /// Example of the expected JSON output.
    #[must_use]
    pub const fn json_template(&self) -> &Value {
        &self.json_template
    }

    /// Worked input/output examples.
    #[must_use]
    pub fn examples(&self) -> &str {
        &self.examples
    }

    /// Message templates.
    #[must_use]
    pub const fn messages(&self) -> &MessagesConfig {
        &self.messages
    }

    /// Extra provider parameters merged into every call.
    #[must_use]
    pub const fn model_parameters(&self) -> &Map<String, Value> {
        &self.model_parameters
    }

    /// Whether decoded output is validated against the response schema.
    #[must_use]
    pub const fn validate_against_schema(&self) -> bool {
        self.validate_against_schema
    }

    /// Ordered, deduplicated list of models to try.
    #[must_use]
    pub fn candidate_models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = Vec::with_capacity(2);
        for model in std::iter::once(self.primary_model.as_str()).chain(self.fallback_model.as_deref()) {
            if !models.contains(&model) {
                models.push(model);
            }
        }
        models
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    primary_model: Option<String>,
    fallback_model: Option<String>,
    response_format: Option<ResponseFormat>,
    field_definitions: Vec<FieldDefinition>,
    json_template: Option<Value>,
    examples: String,
    messages: Option<MessagesConfig>,
    model_parameters: Map<String, Value>,
    validate_against_schema: bool,
}

impl ExtractionConfigBuilder {
    /// Sets the primary model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.primary_model = Some(model.into());
        self
    }

    /// Sets or clears the fallback model. A blank name clears it.
    #[must_use]
    pub fn with_fallback_model(mut self, model: Option<String>) -> Self {
        self.fallback_model = model.filter(|m| !m.trim().is_empty());
        self
    }

    /// Sets the structured-output constraint.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Replaces the field glossary.
    #[must_use]
    pub fn with_field_definitions(mut self, definitions: Vec<FieldDefinition>) -> Self {
        self.field_definitions = definitions;
        self
    }

    /// Sets the example JSON output.
    #[must_use]
    pub fn with_json_template(mut self, template: Value) -> Self {
        self.json_template = Some(template);
        self
    }

    /// Sets the worked examples.
    #[must_use]
    pub fn with_examples(mut self, examples: impl Into<String>) -> Self {
        self.examples = examples.into();
        self
    }

    /// Sets the message templates.
    #[must_use]
    pub fn with_messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Replaces the provider parameters.
    #[must_use]
    pub fn with_model_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.model_parameters = parameters;
        self
    }

    /// Treats schema-invalid output as a decode failure.
    #[must_use]
    pub const fn with_schema_validation(mut self, enabled: bool) -> Self {
        self.validate_against_schema = enabled;
        self
    }

    /// Validates and freezes the configuration.
    pub fn build(self) -> Result<ExtractionConfig, ExtractionError> {
        let primary_model = self
            .primary_model
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ExtractionError::Configuration("primary model is not set".to_string()))?;

        let response_format = self.response_format.ok_or_else(|| {
            ExtractionError::Configuration("response format (JSON schema) is not set".to_string())
        })?;

        let messages = self.messages.ok_or_else(|| {
            ExtractionError::Configuration("message templates are not set".to_string())
        })?;

        if self.validate_against_schema && response_format.schema().is_none() {
            return Err(ExtractionError::Configuration(
                "schema validation requested but the response format carries no JSON schema"
                    .to_string(),
            ));
        }

        Ok(ExtractionConfig {
            primary_model,
            fallback_model: self.fallback_model,
            response_format,
            field_definitions: self.field_definitions,
            json_template: self.json_template.unwrap_or_else(|| Value::Object(Map::new())),
            examples: self.examples,
            messages,
            model_parameters: self.model_parameters,
            validate_against_schema: self.validate_against_schema,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> ExtractionConfigBuilder {
        ExtractionConfig::builder()
            .with_model("gpt-4o-mini")
            .with_response_format(ResponseFormat::json_object())
            .with_messages(MessagesConfig::new(ChatTurn::system("sys"), "{input_text}"))
    }

    #[test]
    fn test_build_requires_primary_model() {
        let err = ExtractionConfig::builder()
            .with_response_format(ResponseFormat::json_object())
            .with_messages(MessagesConfig::new(ChatTurn::system("sys"), "t"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(m) if m.contains("primary model")));

        let blank = base().with_model("  ").build().unwrap_err();
        assert!(matches!(blank, ExtractionError::Configuration(_)));
    }

    #[test]
    fn test_build_requires_response_format() {
        let err = ExtractionConfig::builder()
            .with_model("m")
            .with_messages(MessagesConfig::new(ChatTurn::system("sys"), "t"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(m) if m.contains("response format")));
    }

    #[test]
    fn test_build_requires_messages() {
        let err = ExtractionConfig::builder()
            .with_model("m")
            .with_response_format(ResponseFormat::json_object())
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(m) if m.contains("message templates")));
    }

    #[test]
    fn test_schema_validation_needs_a_schema() {
        let err = base().with_schema_validation(true).build().unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(_)));

        let ok = base()
            .with_response_format(ResponseFormat::json_schema("s", json!({"type": "object"}), true))
            .with_schema_validation(true)
            .build()
            .unwrap();
        assert!(ok.validate_against_schema());
    }

    #[test]
    fn test_candidate_models_deduplicate_in_order() {
        let single = base().build().unwrap();
        assert_eq!(single.candidate_models(), vec!["gpt-4o-mini"]);

        let same = base()
            .with_fallback_model(Some("gpt-4o-mini".to_string()))
            .build()
            .unwrap();
        assert_eq!(same.candidate_models(), vec!["gpt-4o-mini"]);

        let two = base()
            .with_fallback_model(Some("gpt-4o".to_string()))
            .build()
            .unwrap();
        assert_eq!(two.candidate_models(), vec!["gpt-4o-mini", "gpt-4o"]);

        let blank = base().with_fallback_model(Some(String::new())).build().unwrap();
        assert_eq!(blank.fallback_model(), None);
    }

    #[test]
    fn test_json_template_defaults_to_empty_object() {
        let config = base().build().unwrap();
        assert_eq!(config.json_template(), &json!({}));
    }
}
