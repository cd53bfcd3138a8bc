//! Provider resolution: which dispatcher variant and endpoint to bind.
//!
//! | hint                               | base URL | resolves to                    |
//! |------------------------------------|----------|--------------------------------|
//! | none                               | none     | OpenAI, default endpoint       |
//! | none                               | given    | Gemini variant, given URL      |
//! | starts with `gemini` (any case)    | none     | Gemini, Gemini endpoint        |
//! | anything else                      | none     | OpenAI, default endpoint       |
//! | starts with `openai`               | given    | OpenAI, given URL              |
//! | anything else                      | given    | Gemini variant, given URL      |
//!
//! An unrecognized hint without a base URL falls back to OpenAI silently;
//! the resolution is logged at debug level so the choice is visible.

use std::sync::Arc;

use crate::dispatch::{ChatClient, ChatDispatcher, CompletionDispatcher, ParseDispatcher};

/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Gemini OpenAI-compatibility endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Fallback model bound by default to OpenAI extractors.
pub const OPENAI_DEFAULT_FALLBACK_MODEL: &str = "gpt-4o";

/// Dispatcher family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Generic chat-completion call.
    OpenAi,
    /// Structured-output parse call (Gemini OpenAI shim).
    Gemini,
}

impl ProviderKind {
    /// Dispatcher variant for this provider.
    #[must_use]
    pub fn dispatcher(self, client: ChatClient) -> Arc<dyn ChatDispatcher> {
        match self {
            Self::OpenAi => Arc::new(CompletionDispatcher::new(client)),
            Self::Gemini => Arc::new(ParseDispatcher::new(client)),
        }
    }

    /// Fallback model used when the caller does not choose one.
    #[must_use]
    pub const fn default_fallback_model(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some(OPENAI_DEFAULT_FALLBACK_MODEL),
            Self::Gemini => None,
        }
    }
}

/// Outcome of [`resolve_provider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    /// Dispatcher family.
    pub kind: ProviderKind,
    /// Endpoint root.
    pub base_url: String,
}

/// Resolves a provider hint and optional base URL (see the module table).
#[must_use]
pub fn resolve_provider(hint: Option<&str>, base_url: Option<&str>) -> ResolvedProvider {
    let resolved = match (hint, base_url) {
        (None, None) => ResolvedProvider {
            kind: ProviderKind::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
        },
        (None, Some(url)) => ResolvedProvider {
            kind: ProviderKind::Gemini,
            base_url: url.to_string(),
        },
        (Some(hint), None) if hint.to_lowercase().starts_with("gemini") => ResolvedProvider {
            kind: ProviderKind::Gemini,
            base_url: GEMINI_BASE_URL.to_string(),
        },
        (Some(_), None) => ResolvedProvider {
            kind: ProviderKind::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
        },
        (Some(hint), Some(url)) => ResolvedProvider {
            kind: if hint.starts_with("openai") {
                ProviderKind::OpenAi
            } else {
                ProviderKind::Gemini
            },
            base_url: url.to_string(),
        },
    };

    tracing::debug!(
        event = "provider_resolved",
        hint = hint.unwrap_or("<none>"),
        base_url_given = base_url.is_some(),
        kind = ?resolved.kind,
        base_url = %resolved.base_url,
        "provider_resolved"
    );

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hint_no_url_is_openai() {
        let resolved = resolve_provider(None, None);
        assert_eq!(resolved.kind, ProviderKind::OpenAi);
        assert_eq!(resolved.base_url, OPENAI_BASE_URL);
    }

    #[test]
    fn test_url_without_hint_is_gemini_variant() {
        let resolved = resolve_provider(None, Some("http://localhost:8080/v1"));
        assert_eq!(resolved.kind, ProviderKind::Gemini);
        assert_eq!(resolved.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_gemini_hint_binds_gemini_endpoint() {
        for hint in ["gemini", "Gemini-2.0", "GEMINIInfoExtractor"] {
            let resolved = resolve_provider(Some(hint), None);
            assert_eq!(resolved.kind, ProviderKind::Gemini, "hint {hint}");
            assert_eq!(resolved.base_url, GEMINI_BASE_URL);
        }
    }

    #[test]
    fn test_unrecognized_hint_without_url_defaults_to_openai() {
        let resolved = resolve_provider(Some("mistral"), None);
        assert_eq!(resolved.kind, ProviderKind::OpenAi);
        assert_eq!(resolved.base_url, OPENAI_BASE_URL);
    }

    #[test]
    fn test_hint_with_url() {
        let openai = resolve_provider(Some("openai-proxy"), Some("http://proxy/v1"));
        assert_eq!(openai.kind, ProviderKind::OpenAi);
        assert_eq!(openai.base_url, "http://proxy/v1");

        // The openai prefix check is case-sensitive.
        let upper = resolve_provider(Some("OpenAI"), Some("http://proxy/v1"));
        assert_eq!(upper.kind, ProviderKind::Gemini);

        let other = resolve_provider(Some("qwen"), Some("http://dashscope/v1"));
        assert_eq!(other.kind, ProviderKind::Gemini);
    }

    #[test]
    fn test_default_fallback_models() {
        assert_eq!(ProviderKind::OpenAi.default_fallback_model(), Some("gpt-4o"));
        assert_eq!(ProviderKind::Gemini.default_fallback_model(), None);
    }
}
