//! Uniform result envelope returned by every tool

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON object returned by a tool: either the domain payload, or an `error`
/// message plus the context needed to diagnose it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResult(Map<String, Value>);

impl ToolResult {
    /// Wrap a domain payload. Objects are kept as-is, arrays become
    /// `{items, count}` and any other value becomes `{result}`.
    pub fn success(payload: Value) -> Self {
        match payload {
            Value::Object(map) => Self(map),
            Value::Array(items) => {
                let count = items.len();
                Self::from_pairs([("items", Value::Array(items)), ("count", json!(count))])
            }
            other => Self::from_pairs([("result", other)]),
        }
    }

    /// Build an error envelope with optional diagnostic context
    pub fn error<'a>(
        message: impl Into<String>,
        context: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Self {
        let mut map = Map::new();
        map.insert("error".to_string(), Value::String(message.into()));
        for (key, value) in context {
            if key != "error" {
                map.insert(key.to_string(), value);
            }
        }
        Self(map)
    }

    fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Serialized form used as tool-role message content
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Map<String, Value>> for ToolResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
