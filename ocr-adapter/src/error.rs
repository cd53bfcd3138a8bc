use openai_extractor::dispatch::DispatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Vision model call failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Vision model returned only formatting, no text")]
    EmptyResponse,

    #[error("Invalid image: {0}")]
    Image(String),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

}
