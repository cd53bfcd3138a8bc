//! Brace-placeholder rendering for the user-turn template.
//!
//! Syntax: `{name}` is replaced by the value registered under `name`,
//! `{{` and `}}` produce literal braces. Anything else inside braces is an
//! error, so a typo in a template fails before any request is sent.

use super::error::ExtractionError;

/// Renders `template`, substituting each `{name}` with its value in `values`.
///
/// # Examples
///
/// ```
/// use openai_extractor::extraction::template::render;
///
/// let out = render("Text: {input_text} {{raw}}", &[("input_text", "hello")]).unwrap();
/// assert_eq!(out, "Text: hello {raw}");
/// ```
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, ExtractionError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }

                if !closed {
                    return Err(ExtractionError::Template(format!(
                        "unterminated placeholder starting at byte {pos}"
                    )));
                }
                if name.is_empty() {
                    return Err(ExtractionError::Template(format!(
                        "empty placeholder '{{}}' at byte {pos}"
                    )));
                }

                let value = values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| {
                        ExtractionError::Template(format!("unknown placeholder '{{{name}}}'"))
                    })?;
                out.push_str(value);
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(ExtractionError::Template(format!(
                        "single '}}' at byte {pos}; use '}}}}' for a literal brace"
                    )));
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_repeated_placeholders() {
        let out = render("{a}-{b}-{a}", &[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(out, "1-2-1");
    }

    #[test]
    fn test_values_are_not_reinterpreted() {
        let out = render("in: {input_text}", &[("input_text", "{not_a_placeholder}")]).unwrap();
        assert_eq!(out, "in: {not_a_placeholder}");
    }

    #[test]
    fn test_escaped_braces() {
        let out = render("{{\"k\": {v}}}", &[("v", "1")]).unwrap();
        assert_eq!(out, "{\"k\": 1}");
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = render("Hello {nombre}", &[("input_text", "x")]).unwrap_err();
        assert!(matches!(err, ExtractionError::Template(m) if m.contains("{nombre}")));
    }

    #[test]
    fn test_malformed_templates() {
        assert!(render("open {input_text", &[("input_text", "x")]).is_err());
        assert!(render("stray } brace", &[]).is_err());
        assert!(render("empty {}", &[]).is_err());
    }

    #[test]
    fn test_non_ascii_passthrough() {
        let out = render("¿Qué dice {t}? ñ", &[("t", "el vapor")]).unwrap();
        assert_eq!(out, "¿Qué dice el vapor? ñ");
    }
}
