//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Args;
use openai_extractor::prelude::*;
use openai_extractor_ocr::{ImageInput, OcrConfig, OcrCorrector, OcrProcessor};
use serde_json::{Value, json};

/// Exit status when the extraction ran but did not yield JSON.
const EXIT_NOT_EXTRACTED: u8 = 2;

const DASHSCOPE_KEY_VARIABLE: &str = "DASHSCOPE_API_KEY";

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// JSON settings file (model, provider, instructions)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Text file to extract from; stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// API key; defaults to `OPENAI_API_KEY` or `GEMINI_API_KEY` by provider
    #[arg(long)]
    pub api_key: Option<String>,
    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
    /// Include per-attempt history and metrics
    #[arg(long)]
    pub report: bool,
}

#[derive(Args, Debug)]
pub struct VisionArgs {
    /// API key; defaults to `DASHSCOPE_API_KEY`
    #[arg(long)]
    pub api_key: Option<String>,
    /// Vision model identifier
    #[arg(long)]
    pub model: Option<String>,
    /// OpenAI-compatible endpoint root
    #[arg(long)]
    pub base_url: Option<String>,
    /// File replacing the default user prompt
    #[arg(long)]
    pub prompt: Option<PathBuf>,
}

impl VisionArgs {
    fn apply(&self, mut config: OcrConfig) -> anyhow::Result<OcrConfig> {
        if let Some(model) = &self.model {
            config = config.model(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config = config.base_url(base_url.clone());
        }
        if let Some(path) = &self.prompt {
            let prompt = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt {}", path.display()))?;
            config = config.prompts(None, Some(prompt));
        }
        Ok(config)
    }

    fn api_key(&self) -> anyhow::Result<String> {
        api_key(self.api_key.as_deref(), DASHSCOPE_KEY_VARIABLE, |name| {
            std::env::var(name).ok()
        })
    }
}

pub async fn run_extract(args: &ExtractArgs) -> anyhow::Result<ExitCode> {
    let settings = ExtractorSettings::from_path(&args.config)?;
    let provider = resolve_provider(settings.provider.as_deref(), settings.base_url.as_deref());
    let key = api_key(args.api_key.as_deref(), key_variable(provider.kind), |name| {
        std::env::var(name).ok()
    })?;
    let input = read_input(args.input.as_deref())?;

    let extractor = settings.into_builder(key)?.build()?;
    tracing::info!(
        event = "extract_started",
        models = ?extractor.config().candidate_models(),
        input_chars = input.len(),
    );

    let (output, status) = if args.report {
        let report = extractor.extract_with_report(&input).await?;
        (report_json(&report), exit_status(&report.result))
    } else {
        let result = extractor.extract(&input).await?;
        (result.to_envelope(), exit_status(&result))
    };

    println!("{}", render(&output, args.pretty)?);
    Ok(ExitCode::from(status))
}

pub async fn run_ocr(images: &[PathBuf], vision: &VisionArgs) -> anyhow::Result<ExitCode> {
    let config = vision.apply(OcrConfig::extraction())?;
    let images = load_images(images)?;

    let processor = OcrProcessor::new(vision.api_key()?, config)?;
    let text = processor.text_from_images(&images).await?;

    println!("{text}");
    Ok(ExitCode::SUCCESS)
}

pub async fn run_correct(text: &Path, images: &[PathBuf], vision: &VisionArgs) -> anyhow::Result<ExitCode> {
    let config = vision.apply(OcrConfig::correction())?;
    let prior_text = std::fs::read_to_string(text)
        .with_context(|| format!("Failed to read OCR text {}", text.display()))?;
    let images = load_images(images)?;

    let corrector = OcrCorrector::new(vision.api_key()?, config)?;
    let corrected = corrector.correct_text(&prior_text, &images).await?;

    println!("{corrected}");
    Ok(ExitCode::SUCCESS)
}

const fn key_variable(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::Gemini => "GEMINI_API_KEY",
    }
}

/// Explicit key first, then the environment variable.
fn api_key(
    explicit: Option<&str>,
    variable: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    if let Some(key) = explicit.filter(|key| !key.trim().is_empty()) {
        return Ok(key.to_string());
    }
    match lookup(variable) {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!("No API key: pass --api-key or set {variable}"),
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input {}", path.display())),
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read input from stdin"),
    }
}

fn load_images(paths: &[PathBuf]) -> anyhow::Result<Vec<ImageInput>> {
    paths
        .iter()
        .map(|path| {
            ImageInput::from_path(path).with_context(|| format!("Failed to load image {}", path.display()))
        })
        .collect()
}

const fn exit_status(result: &ExtractionResult) -> u8 {
    if result.is_json() { 0 } else { EXIT_NOT_EXTRACTED }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn report_json(report: &ExtractionReport) -> Value {
    let attempts: Vec<Value> = report
        .history
        .iter()
        .map(|record| {
            json!({
                "attempt": record.attempt_number,
                "model": record.model,
                "outcome": record.outcome.label(),
                "elapsed_ms": millis(record.elapsed),
            })
        })
        .collect();

    json!({
        "result": report.result.to_envelope(),
        "attempts": attempts,
        "metrics": {
            "total_attempts": report.metrics.total_attempts,
            "wall_time_ms": millis(report.metrics.wall_time),
            "input_tokens": report.metrics.input_tokens,
            "output_tokens": report.metrics.output_tokens,
            "estimated": report.metrics.estimated,
        },
    })
}

fn render(value: &Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use openai_extractor::extraction::{AttemptOutcome, AttemptRecord, ExtractionMetrics};
    use std::io::Write as _;

    #[test]
    fn test_exit_status_by_variant() {
        let success = ExtractionResult::Success { content: json!({}) };
        let decode = ExtractionResult::DecodeFailure {
            raw_content: "nope".to_string(),
            message: "bad".to_string(),
        };
        let transport = ExtractionResult::TransportFailure {
            message: "down".to_string(),
        };

        assert_eq!(exit_status(&success), 0);
        assert_eq!(exit_status(&decode), EXIT_NOT_EXTRACTED);
        assert_eq!(exit_status(&transport), EXIT_NOT_EXTRACTED);
    }

    #[test]
    fn test_api_key_prefers_explicit() {
        let key = api_key(Some("sk-flag"), "OPENAI_API_KEY", |_| Some("sk-env".to_string())).unwrap();
        assert_eq!(key, "sk-flag");
    }

    #[test]
    fn test_api_key_falls_back_to_variable() {
        let key = api_key(Some("  "), "GEMINI_API_KEY", |name| {
            (name == "GEMINI_API_KEY").then(|| "g-env".to_string())
        })
        .unwrap();
        assert_eq!(key, "g-env");
    }

    #[test]
    fn test_api_key_missing_names_variable() {
        let error = api_key(None, "DASHSCOPE_API_KEY", |_| None).unwrap_err();
        assert!(error.to_string().contains("DASHSCOPE_API_KEY"));
    }

    #[test]
    fn test_key_variable_follows_provider() {
        assert_eq!(key_variable(ProviderKind::OpenAi), "OPENAI_API_KEY");
        assert_eq!(key_variable(ProviderKind::Gemini), "GEMINI_API_KEY");
    }

    #[test]
    fn test_report_json_lists_attempts() {
        let report = ExtractionReport {
            result: ExtractionResult::Success {
                content: json!({"ship": "Rosa"}),
            },
            history: vec![
                AttemptRecord {
                    attempt_number: 1,
                    model: "model-a".to_string(),
                    outcome: AttemptOutcome::DecodeFailed {
                        message: "not json".to_string(),
                    },
                    raw_content: Some("sorry".to_string()),
                    elapsed: Duration::from_millis(120),
                },
                AttemptRecord {
                    attempt_number: 2,
                    model: "model-b".to_string(),
                    outcome: AttemptOutcome::Succeeded,
                    raw_content: Some(r#"{"ship": "Rosa"}"#.to_string()),
                    elapsed: Duration::from_millis(80),
                },
            ],
            metrics: ExtractionMetrics {
                total_attempts: 2,
                wall_time: Duration::from_millis(200),
                input_tokens: 30,
                output_tokens: 8,
                estimated: false,
            },
        };

        let value = report_json(&report);
        assert_eq!(value["result"]["status"], 0);
        assert_eq!(value["attempts"][0]["outcome"], "decode_failed");
        assert_eq!(value["attempts"][1]["model"], "model-b");
        assert_eq!(value["attempts"][0]["elapsed_ms"], 120);
        assert_eq!(value["metrics"]["wall_time_ms"], 200);
        assert_eq!(value["metrics"]["input_tokens"], 30);
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let value = json!({"status": 0});
        assert_eq!(render(&value, false).unwrap(), r#"{"status":0}"#);
        assert!(render(&value, true).unwrap().contains('\n'));
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Entered the brig Esperanza.").unwrap();
        assert_eq!(read_input(Some(file.path())).unwrap(), "Entered the brig Esperanza.");
    }

    #[test]
    fn test_vision_args_override_config() {
        let mut prompt = tempfile::NamedTempFile::new().unwrap();
        write!(prompt, "Transcribe:").unwrap();
        let args = VisionArgs {
            api_key: None,
            model: Some("qwen-vl-max".to_string()),
            base_url: None,
            prompt: Some(prompt.path().to_path_buf()),
        };

        let config = args.apply(OcrConfig::extraction()).unwrap();
        assert_eq!(config.model, "qwen-vl-max");
        assert_eq!(config.user_prompt, "Transcribe:");
        assert_eq!(config.base_url, openai_extractor_ocr::DASHSCOPE_BASE_URL);
    }
}
