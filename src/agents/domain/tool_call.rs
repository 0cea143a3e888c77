//! Tool call requests emitted by the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call requested by the assistant.
///
/// `arguments` is kept as the raw JSON text the model produced so the
/// assistant turn can be echoed back verbatim; the loop parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque call identifier assigned by the provider
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw JSON argument string
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Generate an identifier for providers that do not assign one
    pub fn generate_id() -> String {
        format!("call_{}", &uuid::Uuid::new_v4().simple().to_string()[..24])
    }

    /// Parse the raw argument string. Blank strings count as an empty object.
    pub fn parse_arguments(&self) -> Result<Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arguments() {
        let call = ToolCall::new("call_1", "search_web", r#"{"query":"acme"}"#);
        assert_eq!(call.parse_arguments().unwrap(), json!({ "query": "acme" }));
    }

    #[test]
    fn test_blank_arguments_are_empty_object() {
        let call = ToolCall::new("call_1", "finish", "  ");
        assert_eq!(call.parse_arguments().unwrap(), json!({}));
    }

    #[test]
    fn test_malformed_arguments_error() {
        let call = ToolCall::new("call_1", "finish", r#"{"summary": "#);
        assert!(call.parse_arguments().is_err());
    }

    #[test]
    fn test_generated_id_shape() {
        let id = ToolCall::generate_id();
        assert!(id.starts_with("call_"));
        assert_eq!(id.len(), 29);
    }
}
