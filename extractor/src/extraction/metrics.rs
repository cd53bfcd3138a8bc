//! Metrics tracking and token estimation for extraction operations.

use std::time::Duration;

use crate::dispatch::Usage;

/// Metrics collected during an extraction operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionMetrics {
    /// Total number of attempts made.
    pub total_attempts: usize,
    /// Wall-clock time elapsed during extraction.
    pub wall_time: Duration,
    /// Prompt tokens across attempts.
    pub input_tokens: u64,
    /// Completion tokens across attempts.
    pub output_tokens: u64,
    /// Whether any count above is an estimate rather than provider-reported.
    pub estimated: bool,
}

impl ExtractionMetrics {
    /// Adds one attempt. Provider usage wins; otherwise the texts are estimated.
    pub(crate) fn record_attempt(&mut self, usage: Option<Usage>, prompt: &str, output: Option<&str>) {
        self.total_attempts += 1;
        if let Some(usage) = usage {
            self.input_tokens += usage.prompt_tokens;
            self.output_tokens += usage.completion_tokens;
        } else {
            self.estimated = true;
            self.input_tokens += estimate_tokens(prompt);
            self.output_tokens += output.map_or(0, estimate_tokens);
        }
    }

    /// Adds an attempt whose call never reached the model; no tokens are counted.
    pub(crate) const fn record_transport_failure(&mut self) {
        self.total_attempts += 1;
    }
}

/// Estimate token count from text using the standard 4-chars-per-token heuristic.
///
/// Uses `chars().count()` to handle UTF-8 correctly (not `len()` which counts bytes).
/// Returns ceiling division to avoid underestimation.
///
/// # Examples
///
/// ```
/// use openai_extractor::extraction::estimate_tokens;
///
/// assert_eq!(estimate_tokens("hello"), 2);  // 5 chars / 4 = 1.25 -> 2
/// assert_eq!(estimate_tokens("hello world"), 3);  // 11 chars / 4 = 2.75 -> 3
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    u64::try_from(text.chars().count().div_ceil(4)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_estimate_tokens_utf8() {
        assert_eq!(estimate_tokens("año"), 1);
        assert_eq!(estimate_tokens("vapor inglés"), 3); // 12 chars
    }

    #[test]
    fn test_reported_usage_wins_over_estimate() {
        let mut metrics = ExtractionMetrics::default();
        metrics.record_attempt(
            Some(Usage {
                prompt_tokens: 100,
                completion_tokens: 7,
            }),
            "ignored",
            Some("ignored"),
        );
        assert_eq!(metrics.input_tokens, 100);
        assert_eq!(metrics.output_tokens, 7);
        assert!(!metrics.estimated);

        metrics.record_attempt(None, "abcdefgh", None);
        assert_eq!(metrics.total_attempts, 2);
        assert_eq!(metrics.input_tokens, 102);
        assert_eq!(metrics.output_tokens, 7);
        assert!(metrics.estimated);
    }

    #[test]
    fn test_transport_failure_counts_attempt_only() {
        let mut metrics = ExtractionMetrics::default();
        metrics.record_transport_failure();
        assert_eq!(metrics.total_attempts, 1);
        assert_eq!(metrics.input_tokens, 0);
        assert_eq!(metrics.output_tokens, 0);
        assert!(!metrics.estimated);
    }
}
