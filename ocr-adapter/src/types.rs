use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::OcrError;

pub const DASHSCOPE_BASE_URL: &str = "https://dashscope-intl.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_OCR_MODEL: &str = "qwen2.5-vl-32b-instruct";
pub const MAX_OUTPUT_TOKENS: u64 = 8192;

pub const OCR_SYSTEM_PROMPT: &str = "You are an expert at converting scanned document images into text.";

pub const OCR_USER_PROMPT: &str = "Extract the text contained in the attached images of scanned text documents. \
The returned text must be readable and faithful to the originals.\n\n\
  - Keep the reading order of the original layout. Scans may show wavy or slanted lines, \
bleed-through from the reverse side, faint or excess ink; do not shuffle words or lines.\n\
  - Keep the original spelling and punctuation.\n\
  - Join words hyphenated across lines and remove line breaks inside paragraphs; keep breaks between paragraphs.\n\
  - Pay special attention to numbers (dates, amounts, references); they are hard to verify later.\n\
  - Put text columns one after another, in logical reading order.\n\n\
# Output Format\n\n\
Plain text only, as one readable block, with no explanations, annotations, or markup of any kind \
(no Markdown headers, lists or emphasis).\n\n\
# Notes\n\n\
The document images follow in order. Use all of them:\n\n";

pub const CORRECTION_SYSTEM_PROMPT: &str = "You are an expert at correcting OCR output.";

pub const CORRECTION_USER_PROMPT: &str = "Correct the OCR text below so it is readable and faithful to the \
scanned originals. Inspect both the images and the extracted text.\n\n\
- Fill in passages visible in the images but missed by the OCR.\n\
- Fix recognition errors: misspelled words, wrong punctuation, misread phrases.\n\
  - Leave fragments without evident errors untouched.\n\
- Restore the reading order of the original layout; OCR often shuffles words or lines.\n\
  - Keep the original spelling and punctuation.\n\
- Join words hyphenated across lines and remove line breaks inside paragraphs; keep breaks between paragraphs.\n\
- For numbers (dates, amounts, references) trust the images over the extracted text.\n\n\
# Output Format\n\n\
Plain text only, as one readable block, with no explanations or annotations.\n\n\
# Notes\n\n\
The OCR text for the attached images follows:\n\n";

/// A base64-encoded image sent to the vision model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInput {
    /// e.g. `image/jpeg`.
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix.
    pub data: String,
}

impl ImageInput {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Bare base64 payload, assumed to be JPEG.
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self::new("image/jpeg", data)
    }

    /// Reads and encodes an image file; the MIME type comes from the extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its extension is not a known image type.
    pub fn from_path(path: &Path) -> Result<Self, OcrError> {
        let mime_type = mime_for_path(path)?;
        let bytes = std::fs::read(path)?;
        Ok(Self::new(mime_type, STANDARD.encode(bytes)))
    }

    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn mime_for_path(path: &Path) -> Result<&'static str, OcrError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        "tif" | "tiff" => Ok("image/tiff"),
        "bmp" => Ok("image/bmp"),
        _ => Err(OcrError::Image(format!(
            "unsupported image extension for {}",
            path.display()
        ))),
    }
}

/// Model, endpoint, prompts and call options for one OCR task.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub model: String,
    pub base_url: String,
    pub system_prompt: String,
    /// May contain `{full_text}` for correction prompts.
    pub user_prompt: String,
    pub parameters: Map<String, Value>,
}

impl OcrConfig {
    /// Settings for plain text extraction.
    #[must_use]
    pub fn extraction() -> Self {
        Self::with_prompts(OCR_SYSTEM_PROMPT, OCR_USER_PROMPT)
    }

    /// Settings for OCR correction.
    #[must_use]
    pub fn correction() -> Self {
        Self::with_prompts(CORRECTION_SYSTEM_PROMPT, CORRECTION_USER_PROMPT)
    }

    fn with_prompts(system_prompt: &str, user_prompt: &str) -> Self {
        let mut parameters = Map::new();
        parameters.insert("max_tokens".to_string(), json!(MAX_OUTPUT_TOKENS));
        parameters.insert("top_p".to_string(), json!(0.1));
        parameters.insert("frequency_penalty".to_string(), json!(0));
        parameters.insert("presence_penalty".to_string(), json!(2));

        Self {
            model: DEFAULT_OCR_MODEL.to_string(),
            base_url: DASHSCOPE_BASE_URL.to_string(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            parameters,
        }
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replaces whichever prompts are given, keeping the others.
    #[must_use]
    pub fn prompts(mut self, system_prompt: Option<String>, user_prompt: Option<String>) -> Self {
        if let Some(system_prompt) = system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(user_prompt) = user_prompt {
            self.user_prompt = user_prompt;
        }
        self
    }

    /// Merges call options over the defaults.
    #[must_use]
    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }
}
