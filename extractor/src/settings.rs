//! JSON settings files describing a complete extractor.
//!
//! ```json
//! {
//!   "model": "gpt-4o-mini",
//!   "model_config": {"temperature": 0},
//!   "ai_instructions": {
//!     "field_definitions": {"ship": "vessel name"},
//!     "json_template": {"ship": ""},
//!     "json_schema": {"type": "json_object"},
//!     "examples": "",
//!     "messages_config": {
//!       "system": {"role": "system", "content": "You extract ship arrivals."},
//!       "template": {"content": "{json_template}\n{input_text}"}
//!     }
//!   }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dispatch::ChatTurn;
use crate::extraction::{
    ExtractionError, FieldDefinition, InfoExtractorBuilder, MessagesConfig, ResponseFormat,
};

/// Top-level settings document.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorSettings {
    /// Primary model.
    pub model: String,
    /// Fallback model; absent means provider default, empty string means none.
    #[serde(default)]
    pub fallback_model: Option<String>,
    /// Provider hint.
    #[serde(default)]
    pub provider: Option<String>,
    /// Endpoint override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Provider call options.
    #[serde(default)]
    pub model_config: Map<String, Value>,
    /// Prompt material and output contract.
    pub ai_instructions: AiInstructions,
}

/// Prompt material and output contract.
#[derive(Debug, Clone, Deserialize)]
pub struct AiInstructions {
    /// Field glossary, in document order.
    #[serde(default)]
    pub field_definitions: Map<String, Value>,
    /// Example JSON output.
    #[serde(default)]
    pub json_template: Value,
    /// `response_format` value.
    pub json_schema: Value,
    /// Worked examples.
    #[serde(default)]
    pub examples: String,
    /// `{"system": turn, "template": {"content": ...}}`.
    #[serde(default)]
    pub messages_config: Value,
    /// Validate decoded output against the schema.
    #[serde(default)]
    pub validate_output: bool,
}

impl ExtractorSettings {
    /// Reads and parses a settings file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExtractionError::Settings(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
            .map_err(|e| match e {
                ExtractionError::Settings(msg) => {
                    ExtractionError::Settings(format!("{}: {msg}", path.display()))
                }
                other => other,
            })
    }

    /// Parses a settings document.
    pub fn from_json(text: &str) -> Result<Self, ExtractionError> {
        serde_json::from_str(text).map_err(|e| ExtractionError::Settings(e.to_string()))
    }

    /// Field glossary in document order. Booleans and null read as
    /// `True`, `False` and `None`; other non-string descriptions are
    /// rendered as JSON text.
    #[must_use]
    pub fn field_definitions(&self) -> Vec<FieldDefinition> {
        self.ai_instructions
            .field_definitions
            .iter()
            .map(|(name, description)| {
                let description = match description {
                    Value::String(text) => text.clone(),
                    Value::Bool(true) => "True".to_string(),
                    Value::Bool(false) => "False".to_string(),
                    Value::Null => "None".to_string(),
                    other => other.to_string(),
                };
                FieldDefinition::new(name.clone(), description)
            })
            .collect()
    }

    /// Extracts the system turn and user template from `messages_config`.
    pub fn messages(&self) -> Result<MessagesConfig, ExtractionError> {
        let config = &self.ai_instructions.messages_config;

        let system = config
            .get("system")
            .ok_or_else(|| ExtractionError::Template("messages_config has no 'system' entry".to_string()))?;
        let system: ChatTurn = serde_json::from_value(system.clone())
            .map_err(|e| ExtractionError::Template(format!("invalid 'system' turn: {e}")))?;

        let template = config
            .get("template")
            .and_then(|template| template.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ExtractionError::Template("messages_config has no 'template.content' string".to_string())
            })?;

        Ok(MessagesConfig::new(system, template))
    }

    /// Turns the settings into an extractor builder bound to `api_key`.
    pub fn into_builder(self, api_key: impl Into<String>) -> Result<InfoExtractorBuilder, ExtractionError> {
        let messages = self.messages()?;
        let field_definitions = self.field_definitions();

        let mut builder = InfoExtractorBuilder::new()
            .with_api_key(api_key)
            .with_model(self.model)
            .with_model_parameters(self.model_config)
            .with_field_definitions(field_definitions)
            .with_messages(messages)
            .with_examples(self.ai_instructions.examples)
            .with_response_format(ResponseFormat::raw(self.ai_instructions.json_schema))
            .with_schema_validation(self.ai_instructions.validate_output);

        if !self.ai_instructions.json_template.is_null() {
            builder = builder.with_json_template(self.ai_instructions.json_template);
        }
        if let Some(provider) = self.provider {
            builder = builder.with_provider(provider);
        }
        if let Some(base_url) = self.base_url {
            builder = builder.with_base_url(base_url);
        }
        if let Some(fallback) = self.fallback_model {
            builder = builder.with_fallback_model(Some(fallback).filter(|m| !m.trim().is_empty()));
        }

        Ok(builder)
    }
}
