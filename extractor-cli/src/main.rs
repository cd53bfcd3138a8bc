//! `openai-extractor`: structured extraction and OCR from the command line.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extracts JSON from text using a settings file
    Extract(commands::ExtractArgs),
    /// Reads the text of scanned document images
    Ocr {
        /// Image files, in reading order
        #[arg(long, required = true, num_args = 1..)]
        images: Vec<PathBuf>,
        #[command(flatten)]
        vision: commands::VisionArgs,
    },
    /// Corrects earlier OCR output against the source images
    Correct {
        /// File holding the OCR text to correct
        #[arg(long)]
        text: PathBuf,
        /// Image files, in reading order
        #[arg(long, required = true, num_args = 1..)]
        images: Vec<PathBuf>,
        #[command(flatten)]
        vision: commands::VisionArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Commands::Extract(args) => commands::run_extract(&args).await,
        Commands::Ocr { images, vision } => commands::run_ocr(&images, &vision).await,
        Commands::Correct { text, images, vision } => {
            commands::run_correct(&text, &images, &vision).await
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(event = "command_failed", error = %e);
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
