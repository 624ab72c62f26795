//! API request/response models
//!
//! TigerStyle: Wire shapes are explicit structs, tolerant on input.
//!
//! List/detail responses re-shape the facade's raw JSON into fixed structs
//! so the HTTP contract does not drift with the upstream payloads.

use flowgent_client::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat request from the UI
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Optional conversation context (e.g. the workflow open in the editor)
    #[serde(default)]
    pub context: Option<Value>,
    /// Optional per-request n8n credentials
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Chat response to the UI
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Assistant text
    pub response: String,
    /// Workflow JSON when the turn created one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_data: Option<Value>,
    /// Name of the tool the turn invoked, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Workflow execution request
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub workflow_id: String,
    #[serde(default)]
    pub input_data: Option<Value>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Workflow execution response
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResponse {
    pub execution_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl ExecutionResponse {
    /// Shape an upstream execution payload, tolerating missing fields
    ///
    /// The n8n REST API assigns integer execution ids; the session-protocol
    /// server returns strings. Both map to the same string field here.
    pub fn from_value(value: &Value) -> Self {
        Self {
            execution_id: match value.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => "unknown".to_string(),
            },
            success: value
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            data: value.get("data").filter(|v| !v.is_null()).cloned(),
            error: value.get("error").filter(|v| !v.is_null()).cloned(),
            started_at: string_field(value, "startedAt"),
            finished_at: string_field(value, "finishedAt"),
        }
    }
}

/// One row in the workflow listing
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowListItem {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl WorkflowListItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: value
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Untitled")
                .to_string(),
            active: value
                .get("active")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created_at: string_field(value, "createdAt"),
            updated_at: string_field(value, "updatedAt"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub mcp_connected: bool,
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::new("not_found", format!("{resource} '{id}' not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new("upstream_error", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}
