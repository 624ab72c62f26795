//! Response envelope normalization
//!
//! TigerStyle: Tagged decode per known shape, explicit unknown fallback.
//!
//! The two backends wrap the same logical payloads in different envelopes:
//! bare lists, `{data: [...]}`, `{workflows: [...]}`, `{executions: [...]}`,
//! `{result: ...}`. Rather than probing keys ad hoc at every call site,
//! every response goes through one decode step that names the shape it
//! matched, so the normalization is exhaustively testable.

use serde_json::Value;
use tracing::warn;

/// The recognized list envelope shapes
#[derive(Debug, Clone, PartialEq)]
pub enum ListEnvelope {
    /// A bare JSON array
    Bare(Vec<Value>),
    /// `{"data": [...]}`
    Data(Vec<Value>),
    /// `{"workflows": [...]}`
    Workflows(Vec<Value>),
    /// `{"executions": [...]}`
    Executions(Vec<Value>),
    /// `{"result": [...]}`
    Result(Vec<Value>),
    /// Anything else; carried for logging, normalized to empty
    Unknown(Value),
}

impl ListEnvelope {
    /// Decode a response value into its envelope shape
    pub fn decode(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Bare(items),
            Value::Object(mut map) => {
                for (key, variant) in [
                    ("data", Self::Data as fn(Vec<Value>) -> Self),
                    ("workflows", Self::Workflows),
                    ("executions", Self::Executions),
                    ("result", Self::Result),
                ] {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return variant(items);
                    }
                }
                Self::Unknown(Value::Object(map))
            }
            other => Self::Unknown(other),
        }
    }

    /// Normalize to the canonical item list
    ///
    /// Unknown shapes degrade to an empty list with a warning; the remote
    /// payload shape is not contractually guaranteed, and a failed listing
    /// must not abort the conversation turn.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Bare(items)
            | Self::Data(items)
            | Self::Workflows(items)
            | Self::Executions(items)
            | Self::Result(items) => items,
            Self::Unknown(value) => {
                warn!(shape = %shape_of(&value), "unrecognized list envelope");
                Vec::new()
            }
        }
    }
}

/// Unwrap a single-object envelope: `{"data": {...}}`, `{"result": {...}}`,
/// or the object itself
pub fn unwrap_object(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            for key in ["data", "result", "workflow"] {
                if matches!(map.get(key), Some(Value::Object(_))) {
                    return map.remove(key).unwrap_or(Value::Null);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_list() {
        let envelope = ListEnvelope::decode(json!([{"id": "1"}]));
        assert_eq!(envelope, ListEnvelope::Bare(vec![json!({"id": "1"})]));
        assert_eq!(envelope.into_items().len(), 1);
    }

    #[test]
    fn test_decode_data_envelope() {
        let envelope = ListEnvelope::decode(json!({"data": [{"id": "1"}, {"id": "2"}]}));
        assert!(matches!(envelope, ListEnvelope::Data(_)));
        assert_eq!(envelope.into_items().len(), 2);
    }

    #[test]
    fn test_decode_workflows_envelope() {
        let envelope = ListEnvelope::decode(json!({"workflows": []}));
        assert!(matches!(envelope, ListEnvelope::Workflows(_)));
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn test_decode_executions_envelope() {
        let envelope = ListEnvelope::decode(json!({"executions": [{"id": "e1"}]}));
        assert!(matches!(envelope, ListEnvelope::Executions(_)));
        assert_eq!(envelope.into_items(), vec![json!({"id": "e1"})]);
    }

    #[test]
    fn test_decode_result_envelope() {
        let envelope = ListEnvelope::decode(json!({"result": [1, 2, 3]}));
        assert!(matches!(envelope, ListEnvelope::Result(_)));
        assert_eq!(envelope.into_items().len(), 3);
    }

    #[test]
    fn test_unknown_object_normalizes_to_empty() {
        let envelope = ListEnvelope::decode(json!({"message": "no such key"}));
        assert!(matches!(envelope, ListEnvelope::Unknown(_)));
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn test_unknown_scalar_normalizes_to_empty() {
        let envelope = ListEnvelope::decode(json!("not a list"));
        assert!(matches!(envelope, ListEnvelope::Unknown(_)));
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn test_known_key_with_non_array_value_is_unknown() {
        // {"data": "oops"} must not be treated as a data envelope.
        let envelope = ListEnvelope::decode(json!({"data": "oops"}));
        assert!(matches!(envelope, ListEnvelope::Unknown(_)));
    }

    #[test]
    fn test_unwrap_object_variants() {
        assert_eq!(
            unwrap_object(json!({"data": {"id": "1"}})),
            json!({"id": "1"})
        );
        assert_eq!(
            unwrap_object(json!({"result": {"id": "2"}})),
            json!({"id": "2"})
        );
        assert_eq!(
            unwrap_object(json!({"id": "3", "name": "wf"})),
            json!({"id": "3", "name": "wf"})
        );
        assert_eq!(unwrap_object(json!(null)), json!(null));
    }
}
