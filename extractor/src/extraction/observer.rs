//! Per-attempt observation hook.

use super::error::{AttemptOutcome, AttemptRecord};

/// Receives every finished attempt of an extraction.
///
/// `next_model` is the candidate that will be tried next, if any.
pub trait AttemptObserver: Send + Sync {
    /// Called once per attempt, in order.
    fn on_attempt(&self, record: &AttemptRecord, next_model: Option<&str>);
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AttemptObserver for TracingObserver {
    fn on_attempt(&self, record: &AttemptRecord, next_model: Option<&str>) {
        match &record.outcome {
            AttemptOutcome::Succeeded => tracing::debug!(
                event = "extraction_attempt_succeeded",
                attempt = record.attempt_number,
                model = %record.model,
                elapsed = ?record.elapsed,
                "extraction_attempt_succeeded"
            ),
            AttemptOutcome::DecodeFailed { message } | AttemptOutcome::TransportFailed { message } => {
                tracing::warn!(
                    event = "extraction_attempt_failed",
                    attempt = record.attempt_number,
                    model = %record.model,
                    classification = record.outcome.label(),
                    error = %message,
                    "extraction_attempt_failed"
                );
                if let Some(next) = next_model {
                    tracing::info!(
                        event = "extraction_fallback",
                        from = %record.model,
                        to = next,
                        "extraction_fallback: retrying with model {next}"
                    );
                }
            }
        }
    }
}
