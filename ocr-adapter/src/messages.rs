//! Conversation and call-option shaping for vision requests.

use openai_extractor::dispatch::{ChatTurn, ContentPart, ImageUrl};
use serde_json::{Map, Value, json};

use crate::types::{ImageInput, MAX_OUTPUT_TOKENS};

const FULL_TEXT_PLACEHOLDER: &str = "{full_text}";

/// Builds `[system, user]` where the user turn carries the prompt text
/// followed by one `image_url` part per image, in order.
#[must_use]
pub fn image_messages(system_prompt: &str, user_prompt: &str, images: &[ImageInput]) -> Vec<ChatTurn> {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(ContentPart::Text {
        text: user_prompt.to_string(),
    });
    parts.extend(images.iter().map(|image| ContentPart::ImageUrl {
        image_url: ImageUrl { url: image.data_url() },
    }));

    vec![ChatTurn::system(system_prompt), ChatTurn::user_parts(parts)]
}

/// Places the prior OCR text into the correction prompt.
///
/// `{full_text}` is substituted when present. Otherwise the text is appended,
/// directly after a trailing newline or after a blank line.
#[must_use]
pub fn correction_prompt(prompt: &str, prior_text: &str) -> String {
    if prompt.contains(FULL_TEXT_PLACEHOLDER) {
        prompt.replace(FULL_TEXT_PLACEHOLDER, prior_text)
    } else if prompt.ends_with('\n') {
        format!("{prompt}{prior_text}")
    } else {
        format!("{prompt}\n\n{prior_text}")
    }
}

/// Call options actually sent: `temperature` defaults to 0 and
/// `max_tokens` never exceeds the model's output limit.
#[must_use]
pub fn call_parameters(parameters: &Map<String, Value>) -> Map<String, Value> {
    let mut effective = parameters.clone();
    effective
        .entry("temperature")
        .or_insert_with(|| json!(0));

    let within_limit = effective
        .get("max_tokens")
        .and_then(Value::as_u64)
        .is_some_and(|tokens| tokens <= MAX_OUTPUT_TOKENS);
    if !within_limit {
        effective.insert("max_tokens".to_string(), json!(MAX_OUTPUT_TOKENS));
    }
    effective
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use openai_extractor::dispatch::{MessageContent, Role};

    #[test]
    fn test_image_messages_shape() {
        let images = [ImageInput::jpeg("AAAA"), ImageInput::new("image/png", "BBBB")];
        let messages = image_messages("sys", "read this", &images);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatTurn::system("sys"));
        assert_eq!(messages[1].role, Role::User);

        let wire = serde_json::to_value(&messages[1]).unwrap();
        assert_eq!(
            wire,
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "read this"},
                    {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAAA"}},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,BBBB"}}
                ]
            })
        );
    }

    #[test]
    fn test_image_messages_without_images() {
        let messages = image_messages("sys", "nothing attached", &[]);
        assert_eq!(
            messages[1].content,
            MessageContent::Parts(vec![ContentPart::Text {
                text: "nothing attached".to_string()
            }])
        );
    }

    #[test]
    fn test_correction_prompt_substitutes_placeholder() {
        assert_eq!(
            correction_prompt("Fix this:\n{full_text}\nThanks", "OCR TEXT"),
            "Fix this:\nOCR TEXT\nThanks"
        );
    }

    #[test]
    fn test_correction_prompt_appends() {
        assert_eq!(correction_prompt("Fix this:\n", "OCR"), "Fix this:\nOCR");
        assert_eq!(correction_prompt("Fix this:", "OCR"), "Fix this:\n\nOCR");
    }

    #[test]
    fn test_call_parameters_defaults_and_cap() {
        let mut parameters = Map::new();
        parameters.insert("max_tokens".to_string(), json!(20_000));
        parameters.insert("top_p".to_string(), json!(0.1));

        let effective = call_parameters(&parameters);
        assert_eq!(effective["temperature"], 0);
        assert_eq!(effective["max_tokens"], 8192);
        assert_eq!(effective["top_p"], 0.1);
    }

    #[test]
    fn test_call_parameters_keep_explicit_values() {
        let mut parameters = Map::new();
        parameters.insert("temperature".to_string(), json!(0.7));
        parameters.insert("max_tokens".to_string(), json!(1024));

        let effective = call_parameters(&parameters);
        assert_eq!(effective["temperature"], 0.7);
        assert_eq!(effective["max_tokens"], 1024);
    }

    #[test]
    fn test_call_parameters_fill_missing_max_tokens() {
        let effective = call_parameters(&Map::new());
        assert_eq!(effective["max_tokens"], 8192);
    }
}
