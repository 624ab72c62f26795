//! Session-protocol transport
//!
//! TigerStyle: Explicit handshake, rotating session token, double-decode.
//!
//! The remote tool server requires an `initialize` handshake before any
//! tool call, issues an opaque session token in a response header, and may
//! rotate that token on any response. Tool payloads are JSON-encoded
//! strings nested inside the JSON-RPC result (`content[].text`), so every
//! tool call decodes twice: once for the envelope, once for the embedded
//! text.

use crate::protocol::{
    parse_sse_data, McpRequest, McpResponse, CLIENT_NAME, MCP_PROTOCOL_VERSION,
    MCP_REQUEST_TIMEOUT_MS, SESSION_ID_HEADER,
};
use flowgent_core::http::{HttpClient, HttpRequest};
use flowgent_core::{Error, McpSettings, Result};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Session-protocol client for the remote n8n tool server
///
/// Shared across requests; session token and initialization flag are
/// mutable shared state. Concurrent first requests may both attempt the
/// handshake; each success simply overwrites the cached token, which is
/// wasteful but not corrupting.
pub struct McpClient {
    settings: McpSettings,
    http: Arc<dyn HttpClient>,
    request_id: AtomicU64,
    session: RwLock<Option<String>>,
    initialized: AtomicBool,
}

impl McpClient {
    /// Create a new session-protocol client
    pub fn new(settings: McpSettings, http: Arc<dyn HttpClient>) -> Self {
        Self {
            settings,
            http,
            request_id: AtomicU64::new(0),
            session: RwLock::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// The currently cached session token, if any
    pub async fn session_id(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    /// Whether the handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Perform the protocol handshake
    ///
    /// Idempotent: returns immediately without a network call when a live
    /// session already exists. Fails with a configuration error when no
    /// bearer token is configured.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized() && self.session.read().await.is_some() {
            return Ok(());
        }

        self.settings.validate()?;

        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {"tools": {}},
            "clientInfo": {"name": CLIENT_NAME, "version": env!("CARGO_PKG_VERSION")},
        });

        let result = self.call("initialize", params).await.map_err(|e| {
            error!(error = %e, "MCP initialization failed");
            Error::SessionInit {
                reason: e.to_string(),
            }
        })?;

        self.initialized.store(true, Ordering::SeqCst);
        info!(server_info = ?result.get("serverInfo"), "MCP initialized");
        Ok(())
    }

    /// Make a JSON-RPC call, handling SSE-framed responses
    ///
    /// Attaches the cached session token when present and re-extracts it
    /// from every response: the server may rotate the token at any time.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let envelope = McpRequest::new(self.next_id(), method, params);

        debug!(method = %method, id = envelope.id, "MCP call");

        let mut request = HttpRequest::post(&self.settings.url)
            .with_json_body(&serde_json::to_value(&envelope)?)
            .with_header("Authorization", format!("Bearer {}", self.settings.api_key))
            .with_header("Accept", "application/json, text/event-stream")
            .with_timeout(Duration::from_millis(MCP_REQUEST_TIMEOUT_MS));

        if let Some(session) = self.session.read().await.clone() {
            request = request.with_header(SESSION_ID_HEADER, session);
        }

        let response = self.http.execute(request).await?;

        if !response.is_success() {
            error!(method = %method, status = response.status, "MCP HTTP error");
            return Err(Error::http_status(response.status, &response.body));
        }

        // The server may issue or rotate the session token on any response.
        if let Some(session) = response.header(SESSION_ID_HEADER) {
            let mut cached = self.session.write().await;
            if cached.as_deref() != Some(session) {
                debug!("MCP session token updated");
                *cached = Some(session.to_string());
            }
        }

        let body = response.body.trim();
        let value = match parse_sse_data(body) {
            Some(value) => value,
            None => serde_json::from_str(body)
                .map_err(|e| Error::malformed(format!("MCP response is neither SSE nor JSON: {e}")))?,
        };

        let parsed: McpResponse = serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("invalid JSON-RPC envelope: {e}")))?;

        if let Some(rpc_error) = parsed.error {
            error!(method = %method, code = rpc_error.code, message = %rpc_error.message, "MCP error");
            return Err(Error::protocol(rpc_error.message));
        }

        Ok(parsed.result.unwrap_or(Value::Null))
    }

    /// Call a tool on the server, decoding the nested text payload
    ///
    /// Auto-initializes on first use. The raw result may carry a `content`
    /// list of `{text}` items whose first entry is itself a JSON document;
    /// when it is not valid JSON the joined text is returned as
    /// `{"text": ...}` instead of failing, because the payload shape is
    /// not contractually guaranteed.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        if !self.is_initialized() {
            self.initialize().await?;
        }

        let result = self
            .call("tools/call", json!({"name": name, "arguments": arguments}))
            .await?;

        Ok(decode_tool_payload(result))
    }

    /// List the tools the server exposes
    pub async fn list_tools(&self) -> Result<Vec<Value>> {
        if !self.is_initialized() {
            self.initialize().await?;
        }

        let result = self.call("tools/list", json!({})).await?;
        match result.get("tools").and_then(Value::as_array) {
            Some(tools) => Ok(tools.clone()),
            None => {
                warn!("tools/list result carried no tools array");
                Ok(Vec::new())
            }
        }
    }

    /// Check whether the server is reachable, swallowing all errors
    pub async fn check_connection(&self) -> bool {
        self.initialize().await.is_ok()
    }
}

/// Unwrap the `content[].text` double-encoding of a tool result
fn decode_tool_payload(result: Value) -> Value {
    let Some(content) = result.get("content").and_then(Value::as_array) else {
        return result;
    };

    let texts: Vec<&str> = content
        .iter()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect();

    match texts.first() {
        Some(first) => match serde_json::from_str(first) {
            Ok(value) => value,
            Err(_) => json!({"text": texts.join("\n")}),
        },
        None => result,
    }
}
