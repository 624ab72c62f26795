//! Session-protocol wire format
//!
//! TigerStyle: Protocol-compliant message types, explicit SSE framing.
//!
//! The remote tool server speaks JSON-RPC 2.0 over HTTP POST. Successful
//! responses may arrive SSE-framed: a text body whose `data:`-prefixed
//! lines carry exactly one JSON document per call. Both framings must
//! decode to the same envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol version declared during the handshake
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Response/request header carrying the opaque session token
pub const SESSION_ID_HEADER: &str = "Mcp-Session-Id";

/// Client identity declared during the handshake
pub const CLIENT_NAME: &str = "flowgent";

/// Default request timeout for session-protocol calls
pub const MCP_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID
    pub id: u64,
    /// Method name
    pub method: String,
    /// Parameters
    pub params: Value,
}

impl McpRequest {
    /// Create a new request
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response envelope
///
/// Only `result`/`error` are load-bearing; some servers omit the
/// `jsonrpc` member on SSE-framed payloads, so it defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    /// JSON-RPC version
    #[serde(default)]
    pub jsonrpc: String,
    /// Request ID this responds to
    #[serde(default)]
    pub id: Option<u64>,
    /// Result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// JSON-RPC error member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Extract the JSON payload from an SSE-framed body
///
/// Scans lines for a `data:` prefix and parses the first such line as
/// JSON. Returns `None` when no parseable `data:` line is present, in
/// which case callers fall back to parsing the body as bare JSON.
pub fn parse_sse_data(body: &str) -> Option<Value> {
    for line in body.lines() {
        let line = line.trim();
        if let Some(payload) = line.strip_prefix("data:") {
            let payload = payload.trim();
            if payload.is_empty() {
                continue;
            }
            if let Ok(value) = serde_json::from_str(payload) {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcp_request_envelope() {
        let request = McpRequest::new(7, "tools/list", serde_json::json!({}));
        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.id, 7);
        assert_eq!(request.method, "tools/list");

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["jsonrpc"], "2.0");
        assert_eq!(wire["params"], serde_json::json!({}));
    }

    #[test]
    fn test_parse_sse_data_framed() {
        let body = "event: message\ndata: {\"result\": 42}\n\n";
        let value = parse_sse_data(body).unwrap();
        assert_eq!(value["result"], 42);
    }

    #[test]
    fn test_parse_sse_data_bare_json_is_none() {
        assert!(parse_sse_data("{\"result\": 42}").is_none());
    }

    #[test]
    fn test_parse_sse_data_skips_empty_data_lines() {
        let body = "data:\ndata: {\"ok\": true}\n";
        let value = parse_sse_data(body).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_parse_sse_data_whitespace_tolerant() {
        let body = "  data:   {\"result\": 1}  \n";
        let value = parse_sse_data(body).unwrap();
        assert_eq!(value["result"], 1);
    }

    #[test]
    fn test_response_without_jsonrpc_member() {
        let response: McpResponse = serde_json::from_str("{\"result\": 42}").unwrap();
        assert_eq!(response.result, Some(serde_json::json!(42)));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_response_with_error_member() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32600,"message":"bad request"}}"#;
        let response: McpResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.error.unwrap().message, "bad request");
    }
}
