//! Builds the `[system, user]` conversation for one extraction attempt.

use std::io;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;

use super::config::{ExtractionConfig, FieldDefinition};
use super::error::ExtractionError;
use super::template::render;
use crate::dispatch::ChatTurn;

/// Placeholder for the serialized JSON template.
pub const JSON_TEMPLATE: &str = "json_template";
/// Placeholder for the field glossary.
pub const FIELD_DEFINITIONS: &str = "field_definitions";
/// Placeholder for the worked examples.
pub const INPUT_EXAMPLE: &str = "input_example";
/// Placeholder for the caller's text.
pub const INPUT_TEXT: &str = "input_text";

/// Renders the field glossary as `'name': 'description'` entries joined by `". "`.
///
/// # Examples
///
/// ```
/// use openai_extractor::extraction::FieldDefinition;
/// use openai_extractor::extraction::composer::field_definitions_text;
///
/// let text = field_definitions_text(&[
///     FieldDefinition::new("ship", "vessel name"),
///     FieldDefinition::new("port", "port of departure"),
/// ]);
/// assert_eq!(text, "'ship': 'vessel name'. 'port': 'port of departure'");
/// ```
#[must_use]
pub fn field_definitions_text(definitions: &[FieldDefinition]) -> String {
    definitions
        .iter()
        .map(|def| format!("'{}': '{}'", def.name, def.description))
        .collect::<Vec<_>>()
        .join(". ")
}

/// Formatter with `", "` and `": "` separators, the layout prompt authors
/// write their JSON examples in.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Serializes `value` on one line with spaced separators, keeping non-ASCII
/// characters and key order as they are.
pub fn template_json(value: &Value) -> Result<String, ExtractionError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ExtractionError::Template(format!("could not serialize JSON template: {e}")))?;
    String::from_utf8(buf)
        .map_err(|e| ExtractionError::Template(format!("JSON template is not UTF-8: {e}")))
}

/// Composes the conversation for `input_text`.
///
/// Always returns exactly two turns: the configured system turn, then the
/// rendered user turn. Identical inputs give identical output.
pub fn compose(config: &ExtractionConfig, input_text: &str) -> Result<Vec<ChatTurn>, ExtractionError> {
    let json_template = template_json(config.json_template())?;
    let field_definitions = field_definitions_text(config.field_definitions());

    let user_message = render(
        &config.messages().user_template,
        &[
            (JSON_TEMPLATE, &json_template),
            (FIELD_DEFINITIONS, &field_definitions),
            (INPUT_EXAMPLE, config.examples()),
            (INPUT_TEXT, input_text),
        ],
    )?;

    Ok(vec![config.messages().system.clone(), ChatTurn::user(user_message)])
}
