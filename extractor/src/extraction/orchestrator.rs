//! Model-fallback controller for structured extraction.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;

use super::composer::compose;
use super::config::ExtractionConfig;
use super::error::{AttemptOutcome, AttemptRecord, ExtractionError};
use super::metrics::ExtractionMetrics;
use super::observer::{AttemptObserver, TracingObserver};
use super::result::{ExtractionReport, ExtractionResult};
use crate::dispatch::{ChatDispatcher, ChatRequest, ChatTurn};

/// Extracts structured JSON from free text, falling back to a second model
/// when the first one fails.
///
/// The extractor is immutable: the model of each attempt is a local value
/// passed to the composer and dispatcher, so one instance can serve
/// concurrent calls.
pub struct InfoExtractor {
    config: ExtractionConfig,
    dispatcher: Arc<dyn ChatDispatcher>,
    observer: Arc<dyn AttemptObserver>,
}

impl std::fmt::Debug for InfoExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InfoExtractor {
    /// Creates an extractor from a validated configuration and a dispatcher.
    #[must_use]
    pub fn new(config: ExtractionConfig, dispatcher: Arc<dyn ChatDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the attempt observer (fluent builder pattern).
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn AttemptObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The configuration this extractor runs with.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Runs the extraction and returns only the tagged result.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Template` if the user template cannot be
    /// rendered, `ExtractionError::Configuration` if schema validation is on
    /// and the schema does not compile. Both happen before any remote call.
    /// Model-call and decode failures are returned inside the result.
    pub async fn extract(&self, input_text: &str) -> Result<ExtractionResult, ExtractionError> {
        Ok(self.extract_with_report(input_text).await?.result)
    }

    /// Runs the extraction and returns the result with attempt history and metrics.
    pub async fn extract_with_report(&self, input_text: &str) -> Result<ExtractionReport, ExtractionError> {
        let start = Instant::now();
        let candidates = self.config.candidate_models();
        let mut history: Vec<AttemptRecord> = Vec::with_capacity(candidates.len());
        let mut metrics = ExtractionMetrics::default();
        let mut last_raw_content: Option<String> = None;

        // Compile the schema up front so a bad schema fails before any call.
        let validator = if self.config.validate_against_schema() {
            let schema = self.config.response_format().schema().ok_or_else(|| {
                ExtractionError::Configuration("response format carries no JSON schema".to_string())
            })?;
            Some(
                jsonschema::Validator::new(schema)
                    .map_err(|e| ExtractionError::Configuration(format!("invalid response schema: {e}")))?,
            )
        } else {
            None
        };

        for (index, model) in candidates.iter().copied().enumerate() {
            let attempt_number = index + 1;
            let next_model = candidates.get(attempt_number).copied();

            let messages = compose(&self.config, input_text)?;
            let request = ChatRequest {
                model,
                messages: &messages,
                response_format: Some(self.config.response_format().as_value()),
                parameters: self.config.model_parameters(),
            };

            let response = match self.dispatcher.dispatch(&request).await {
                Ok(response) => response,
                Err(error) => {
                    metrics.record_transport_failure();
                    self.record(
                        &mut history,
                        AttemptRecord {
                            attempt_number,
                            model: model.to_string(),
                            outcome: AttemptOutcome::TransportFailed {
                                message: error.to_string(),
                            },
                            raw_content: None,
                            elapsed: start.elapsed(),
                        },
                        next_model,
                    );

                    if next_model.is_some() {
                        continue;
                    }

                    let result = match last_raw_content.take() {
                        Some(raw_content) => ExtractionResult::TransportFailureWithContent {
                            raw_content,
                            message: format!(
                                "All extraction attempts failed. Returning the last raw content obtained; \
                                 model {model} failed with: {error}"
                            ),
                        },
                        None => ExtractionResult::TransportFailure {
                            message: format!(
                                "No content could be obtained after trying models [{}]. \
                                 Last error, from model {model}: {error}",
                                candidates.join(", ")
                            ),
                        },
                    };
                    return Ok(finish(result, history, metrics, start));
                }
            };

            metrics.record_attempt(response.usage, &prompt_text(&messages), Some(&response.content));
            if !response.content.is_empty() {
                last_raw_content = Some(response.content.clone());
            }

            match decode(&response.content, validator.as_ref()) {
                Ok(content) => {
                    self.record(
                        &mut history,
                        AttemptRecord {
                            attempt_number,
                            model: model.to_string(),
                            outcome: AttemptOutcome::Succeeded,
                            raw_content: Some(response.content),
                            elapsed: start.elapsed(),
                        },
                        None,
                    );
                    return Ok(finish(ExtractionResult::Success { content }, history, metrics, start));
                }
                Err(reason) => {
                    let message = format!("Could not decode the response of model {model} as JSON: {reason}");
                    self.record(
                        &mut history,
                        AttemptRecord {
                            attempt_number,
                            model: model.to_string(),
                            outcome: AttemptOutcome::DecodeFailed {
                                message: message.clone(),
                            },
                            raw_content: Some(response.content.clone()),
                            elapsed: start.elapsed(),
                        },
                        next_model,
                    );

                    if next_model.is_none() {
                        let result = ExtractionResult::DecodeFailure {
                            raw_content: response.content,
                            message: format!(
                                "{message}. All JSON extraction attempts failed; returning the raw content."
                            ),
                        };
                        return Ok(finish(result, history, metrics, start));
                    }
                }
            }
        }

        // Only reachable with an empty candidate list, which the config builder forbids.
        Err(ExtractionError::Configuration(
            "no candidate models to try".to_string(),
        ))
    }

    fn record(&self, history: &mut Vec<AttemptRecord>, record: AttemptRecord, next_model: Option<&str>) {
        self.observer.on_attempt(&record, next_model);
        history.push(record);
    }
}

/// Decodes `content` as JSON and, when a validator is given, checks it.
fn decode(content: &str, validator: Option<&jsonschema::Validator>) -> Result<Value, String> {
    let value = serde_json::from_str::<Value>(content).map_err(|e| e.to_string())?;

    if let Some(validator) = validator {
        let errors: Vec<String> = validator
            .iter_errors(&value)
            .map(|error| format!("At path '{}': {}", error.instance_path, error))
            .collect();
        if !errors.is_empty() {
            return Err(format!("schema validation failed: {}", errors.join("; ")));
        }
    }

    Ok(value)
}

fn prompt_text(messages: &[ChatTurn]) -> String {
    messages
        .iter()
        .map(|turn| turn.content.text())
        .collect::<Vec<_>>()
        .join("\n")
}

fn finish(
    result: ExtractionResult,
    history: Vec<AttemptRecord>,
    mut metrics: ExtractionMetrics,
    start: Instant,
) -> ExtractionReport {
    metrics.wall_time = start.elapsed();
    ExtractionReport {
        result,
        history,
        metrics,
    }
}
