//! `response_format` values passed to the provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured-output constraint sent as `response_format`.
///
/// Opaque to the controller; the provider enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseFormat(Value);

impl ResponseFormat {
    /// Uses `value` verbatim.
    #[must_use]
    pub const fn raw(value: Value) -> Self {
        Self(value)
    }

    /// JSON mode without a schema.
    #[must_use]
    pub fn json_object() -> Self {
        Self(json!({"type": "json_object"}))
    }

    /// JSON-schema mode.
    #[must_use]
    pub fn json_schema(name: impl Into<String>, schema: Value, strict: bool) -> Self {
        Self(json!({
            "type": "json_schema",
            "json_schema": {
                "name": name.into(),
                "schema": schema,
                "strict": strict,
            }
        }))
    }

    /// JSON-schema mode with the schema generated from `T`.
    #[must_use]
    pub fn for_type<T: JsonSchema>(name: impl Into<String>) -> Self {
        let schema = schemars::schema_for!(T);
        let schema = serde_json::to_value(&schema).unwrap_or_default();
        Self::json_schema(name, schema, false)
    }

    /// The value sent on the wire.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Inner JSON schema, when this is a `json_schema` format.
    #[must_use]
    pub fn schema(&self) -> Option<&Value> {
        if self.0.get("type").and_then(Value::as_str) != Some("json_schema") {
            return None;
        }
        self.0.get("json_schema").and_then(|spec| spec.get("schema"))
    }
}
