//! Strips residual Markdown from vision-model answers.
//!
//! Models asked for plain text still emit headers, emphasis and code fences
//! now and then. Patterns run in a fixed order: headers, emphasis, list
//! markers, fenced code, inline code, links.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("markdown pattern is a valid regex")
}

static HEADER: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^#+\s*"));
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| pattern(r"[*_]{1,3}([^*_]+)[*_]{1,3}"));
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^(?:[-*]|\d+\.)\s+"));
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)```.*?\n(.*?)```"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| pattern(r"`([^`]+)`"));
static LINK: LazyLock<Regex> = LazyLock::new(|| pattern(r"\[([^\]]*)\]\([^)]*\)"));

/// Removes Markdown markup and trims surrounding whitespace.
///
/// ```
/// use openai_extractor_ocr::remove_markdown;
///
/// assert_eq!(remove_markdown("# Title\n**bold** text"), "Title\nbold text");
/// ```
#[must_use]
pub fn remove_markdown(text: &str) -> String {
    let text = HEADER.replace_all(text, "");
    let text = EMPHASIS.replace_all(&text, "$1");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = FENCED_CODE.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    text.trim().to_string()
}
