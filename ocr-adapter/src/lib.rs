//! OCR through OpenAI-compatible vision models.
//!
//! [`OcrProcessor`] turns scanned page images into plain text;
//! [`OcrCorrector`] fixes an earlier OCR pass against the same images.
//! Both default to Qwen-VL on `DashScope`.
#![warn(clippy::pedantic)]
pub mod error;
pub mod markdown;
pub mod messages;
pub mod types;

use std::sync::Arc;

use openai_extractor::dispatch::{
    ApiKey, ChatClient, ChatDispatcher, ChatRequest, ChatTurn, ClientConfig, CompletionDispatcher,
};

pub use error::OcrError;
pub use markdown::remove_markdown;
pub use types::*;

/// Sends one vision request and cleans the answer.
#[derive(Clone)]
struct VisionCall {
    config: OcrConfig,
    dispatcher: Arc<dyn ChatDispatcher>,
}

impl VisionCall {
    fn connect(api_key: ApiKey, config: OcrConfig) -> Result<Self, OcrError> {
        let client = ChatClient::new(config.base_url.clone(), api_key, &ClientConfig::default())?;
        Ok(Self {
            config,
            dispatcher: Arc::new(CompletionDispatcher::new(client)),
        })
    }

    async fn run(&self, user_prompt: &str, images: &[ImageInput]) -> Result<String, OcrError> {
        let messages: Vec<ChatTurn> =
            messages::image_messages(&self.config.system_prompt, user_prompt, images);
        let parameters = messages::call_parameters(&self.config.parameters);
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            response_format: None,
            parameters: &parameters,
        };

        tracing::debug!(
            event = "ocr_request",
            model = %self.config.model,
            images = images.len(),
        );

        let response = self.dispatcher.dispatch(&request).await?;
        let text = remove_markdown(&response.content);
        if text.is_empty() {
            tracing::warn!(event = "ocr_empty_response", model = %response.model);
            return Err(OcrError::EmptyResponse);
        }

        tracing::debug!(event = "ocr_response", model = %response.model, chars = text.len());
        Ok(text)
    }
}

/// Extracts plain text from document images.
#[derive(Clone)]
pub struct OcrProcessor {
    call: VisionCall,
}

impl OcrProcessor {
    /// Connects to `config.base_url` with `api_key`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>, config: OcrConfig) -> Result<Self, OcrError> {
        Ok(Self {
            call: VisionCall::connect(ApiKey::new(api_key), config)?,
        })
    }

    /// Uses an already built dispatcher, e.g. a scripted one in tests.
    #[must_use]
    pub fn with_dispatcher(config: OcrConfig, dispatcher: Arc<dyn ChatDispatcher>) -> Self {
        Self {
            call: VisionCall { config, dispatcher },
        }
    }

    #[must_use]
    pub const fn config(&self) -> &OcrConfig {
        &self.call.config
    }

    /// Reads the text of `images`, in order, as one block.
    ///
    /// # Errors
    /// Returns an error if the model call fails or the answer has no text.
    pub async fn text_from_images(&self, images: &[ImageInput]) -> Result<String, OcrError> {
        self.call.run(&self.call.config.user_prompt, images).await
    }
}

/// Corrects earlier OCR output using the source images.
#[derive(Clone)]
pub struct OcrCorrector {
    call: VisionCall,
}

impl OcrCorrector {
    /// Connects to `config.base_url` with `api_key`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>, config: OcrConfig) -> Result<Self, OcrError> {
        Ok(Self {
            call: VisionCall::connect(ApiKey::new(api_key), config)?,
        })
    }

    #[must_use]
    pub fn with_dispatcher(config: OcrConfig, dispatcher: Arc<dyn ChatDispatcher>) -> Self {
        Self {
            call: VisionCall { config, dispatcher },
        }
    }

    #[must_use]
    pub const fn config(&self) -> &OcrConfig {
        &self.call.config
    }

    /// Returns a corrected version of `prior_text`.
    ///
    /// # Errors
    /// Returns an error if the model call fails or the answer has no text.
    pub async fn correct_text(&self, prior_text: &str, images: &[ImageInput]) -> Result<String, OcrError> {
        let prompt = messages::correction_prompt(&self.call.config.user_prompt, prior_text);
        self.call.run(&prompt, images).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use openai_extractor::dispatch::{DispatchError, MessageContent, RawResponse};
    use serde_json::{Map, Value};
    use std::sync::Mutex;

    /// Answers every call with a fixed text and records what it was sent.
    struct FixedDispatcher {
        answer: Result<String, DispatchError>,
        seen: Mutex<Vec<(Vec<ChatTurn>, Map<String, Value>)>>,
    }

    impl FixedDispatcher {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatDispatcher for FixedDispatcher {
        async fn dispatch(&self, request: &ChatRequest<'_>) -> Result<RawResponse, DispatchError> {
            self.seen
                .lock()
                .unwrap()
                .push((request.messages.to_vec(), request.parameters.clone()));
            assert!(request.response_format.is_none());
            match &self.answer {
                Ok(content) => Ok(RawResponse {
                    model: request.model.to_string(),
                    content: content.clone(),
                    finish_reason: Some("stop".to_string()),
                    usage: None,
                }),
                Err(_) => Err(DispatchError::RateLimited(request.model.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_text_from_images_strips_markdown() {
        let dispatcher = FixedDispatcher::answering("# Page 1\n**Entered** the brig Esperanza.\n");
        let processor = OcrProcessor::with_dispatcher(OcrConfig::extraction(), dispatcher.clone());

        let text = processor.text_from_images(&[ImageInput::jpeg("AAAA")]).await.unwrap();
        assert_eq!(text, "Page 1\nEntered the brig Esperanza.");

        let seen = dispatcher.seen.lock().unwrap();
        let (messages, parameters) = &seen[0];
        assert_eq!(messages[0], ChatTurn::system(OCR_SYSTEM_PROMPT));
        assert_eq!(messages[1].content.text(), OCR_USER_PROMPT);
        assert_eq!(parameters["temperature"], 0);
        assert_eq!(parameters["presence_penalty"], 2);
    }

    #[tokio::test]
    async fn test_correct_text_places_prior_text() {
        let dispatcher = FixedDispatcher::answering("Corrected text.");
        let config = OcrConfig::correction().prompts(None, Some("Fix:".to_string()));
        let corrector = OcrCorrector::with_dispatcher(config, dispatcher.clone());

        let text = corrector
            .correct_text("Corected txt.", &[ImageInput::jpeg("AAAA")])
            .await
            .unwrap();
        assert_eq!(text, "Corrected text.");

        let seen = dispatcher.seen.lock().unwrap();
        let MessageContent::Parts(parts) = &seen[0].0[1].content else {
            unreachable!("user turn carries parts");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(seen[0].0[1].content.text(), "Fix:\n\nCorected txt.");
    }

    #[tokio::test]
    async fn test_markup_only_answer_is_empty() {
        let processor =
            OcrProcessor::with_dispatcher(OcrConfig::extraction(), FixedDispatcher::answering("```\n```"));
        let result = processor.text_from_images(&[]).await;
        assert!(matches!(result, Err(OcrError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_dispatch_errors_propagate() {
        let dispatcher = Arc::new(FixedDispatcher {
            answer: Err(DispatchError::RateLimited(String::new())),
            seen: Mutex::new(Vec::new()),
        });
        let processor = OcrProcessor::with_dispatcher(OcrConfig::extraction(), dispatcher);
        let result = processor.text_from_images(&[ImageInput::jpeg("AAAA")]).await;
        assert!(matches!(result, Err(OcrError::Dispatch(DispatchError::RateLimited(_)))));
    }
}
