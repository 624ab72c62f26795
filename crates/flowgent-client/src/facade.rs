//! Unified workflow tool facade
//!
//! TigerStyle: One facade, two transports, errors stop here.
//!
//! Every operation the agent loop or the API routes need goes through
//! [`WorkflowService`]. Node/template discovery always uses the session
//! protocol. Workflow CRUD and execution select a transport per call: when
//! the caller supplies complete instance credentials the direct REST API is
//! used, otherwise the session protocol. Execution additionally falls back
//! from REST to the session protocol on any failure.
//!
//! No method on this type returns a transport error. Each one catches at
//! its own boundary and returns a tagged [`ToolOutcome`], so a failed tool
//! call degrades to an error message inside the conversation instead of
//! aborting the turn.

use crate::catalog;
use crate::credentials::Credentials;
use crate::envelope::{unwrap_object, ListEnvelope};
use crate::rest::RestClient;
use crate::session::McpClient;
use crate::workflow::{linear_chain_names, WorkflowUpdate};
use flowgent_core::http::HttpClient;
use flowgent_core::{Error, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default result limit for node searches
pub const SEARCH_NODES_LIMIT_DEFAULT: u32 = 10;

/// Default result limit for template searches
pub const SEARCH_TEMPLATES_LIMIT_DEFAULT: u32 = 5;

/// Tagged result of a facade operation
///
/// Serializes as `{"status": "success", "data": ...}`,
/// `{"status": "not_found", "message": ...}`, or
/// `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { data: Value },
    NotFound { message: String },
    Error { message: String },
}

impl ToolOutcome {
    pub fn success(data: Value) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Classify a transport result
    ///
    /// Missing resources become `NotFound`; every other failure becomes
    /// `Error` with the error's display text as the message.
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(e) if e.is_not_found() => Self::NotFound {
                message: e.to_string(),
            },
            Err(e) => Self::Error {
                message: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The payload to hand back to the model as the tool result
    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|_| {
            json!({"status": "error", "message": "unserializable tool outcome"})
        })
    }
}

/// The unified facade over both n8n transports
pub struct WorkflowService {
    mcp: Arc<McpClient>,
    http: Arc<dyn HttpClient>,
}

impl WorkflowService {
    pub fn new(mcp: Arc<McpClient>, http: Arc<dyn HttpClient>) -> Self {
        Self { mcp, http }
    }

    /// The underlying session-protocol client
    pub fn mcp(&self) -> &Arc<McpClient> {
        &self.mcp
    }

    fn rest(&self, credentials: &Credentials) -> RestClient {
        RestClient::new(
            &credentials.instance_url,
            credentials.api_key.clone(),
            self.http.clone(),
        )
    }

    // ========================================================================
    // Discovery (session protocol only)
    // ========================================================================

    /// Search the node catalog by keyword
    pub async fn search_nodes(&self, query: &str, limit: Option<u32>) -> ToolOutcome {
        let limit = limit.unwrap_or(SEARCH_NODES_LIMIT_DEFAULT);
        ToolOutcome::from_result(
            self.mcp
                .call_tool("search_nodes", json!({"query": query, "limit": limit}))
                .await,
        )
    }

    /// Fetch documentation for a node type
    pub async fn get_node_docs(&self, node_type: &str) -> ToolOutcome {
        ToolOutcome::from_result(
            self.mcp
                .call_tool("get_node", json!({"nodeType": node_type, "mode": "docs"}))
                .await,
        )
    }

    /// Fetch documentation merged with presentation fields
    ///
    /// The remote description is truncated to the card budget; display
    /// name, category, icon and popularity are derived locally so the UI
    /// never depends on the remote payload carrying them.
    pub async fn get_node_info(&self, node_type: &str) -> ToolOutcome {
        let result = self
            .mcp
            .call_tool("get_node", json!({"nodeType": node_type, "mode": "docs"}))
            .await
            .map(|docs| decorate_node(node_type, docs));
        ToolOutcome::from_result(result)
    }

    /// Build a preview card for a node type without a remote call
    pub fn node_preview(&self, node_type: &str, description: Option<&str>) -> Value {
        let mut card = json!({
            "nodeType": node_type,
            "displayName": catalog::display_name(node_type),
            "category": catalog::category(node_type),
            "icon": catalog::icon(node_type),
            "popularity": catalog::popularity(node_type),
        });
        if let Some(text) = description {
            card["description"] =
                json!(catalog::truncate_description(text, catalog::NODE_PREVIEW_CHARS_MAX));
        }
        card
    }

    /// Search workflow templates by keyword
    pub async fn search_templates(&self, query: &str, limit: Option<u32>) -> ToolOutcome {
        let limit = limit.unwrap_or(SEARCH_TEMPLATES_LIMIT_DEFAULT);
        ToolOutcome::from_result(
            self.mcp
                .call_tool("search_templates", json!({"query": query, "limit": limit}))
                .await,
        )
    }

    /// Fetch a full workflow template
    pub async fn get_template(&self, template_id: u64) -> ToolOutcome {
        ToolOutcome::from_result(
            self.mcp
                .call_tool("get_template", json!({"templateId": template_id}))
                .await,
        )
    }

    /// Validate a workflow document without saving it
    pub async fn validate_workflow(&self, workflow: Value) -> ToolOutcome {
        ToolOutcome::from_result(
            self.mcp
                .call_tool("validate_workflow", json!({"workflow": workflow}))
                .await,
        )
    }

    // ========================================================================
    // Workflow CRUD (transport-selected)
    // ========================================================================

    /// List workflows on the selected backend
    pub async fn list_workflows(&self, credentials: Option<&Credentials>) -> ToolOutcome {
        let result = match credentials {
            Some(creds) => {
                debug!("listing workflows via direct API");
                self.rest(creds).list_workflows().await
            }
            None => self
                .mcp
                .call_tool("n8n_list_workflows", json!({}))
                .await
                .map(|v| ListEnvelope::decode(v).into_items()),
        };
        ToolOutcome::from_result(result.map(Value::Array))
    }

    /// Get a workflow by id
    ///
    /// Both backends normalize to the same `not_found` outcome: the direct
    /// API via its 404, the session protocol via an absent result.
    pub async fn get_workflow(
        &self,
        workflow_id: &str,
        credentials: Option<&Credentials>,
    ) -> ToolOutcome {
        let result = match credentials {
            Some(creds) => self.rest(creds).get_workflow(workflow_id).await,
            None => self
                .mcp
                .call_tool("n8n_get_workflow", json!({"id": workflow_id}))
                .await
                .map(unwrap_object)
                .and_then(|value| {
                    if value.is_null() {
                        Err(Error::not_found("workflow", workflow_id))
                    } else {
                        Ok(value)
                    }
                }),
        };
        ToolOutcome::from_result(result)
    }

    /// Create a workflow, synthesizing connections when none were supplied
    ///
    /// Auto-connection runs only when the caller supplied no connection
    /// graph at all (absent or an empty mapping) and at least two nodes
    /// carry names; a partial graph is passed through untouched, never
    /// merged with a synthesized one.
    pub async fn create_workflow(
        &self,
        name: &str,
        nodes: Vec<Value>,
        connections: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> ToolOutcome {
        let connections = resolve_connections(&nodes, connections);

        let result = match credentials {
            Some(creds) => {
                debug!(name = %name, "creating workflow via direct API");
                self.rest(creds).create_workflow(name, nodes, connections).await
            }
            None => self
                .mcp
                .call_tool(
                    "n8n_create_workflow",
                    json!({"name": name, "nodes": nodes, "connections": connections}),
                )
                .await
                .map(unwrap_object),
        };
        ToolOutcome::from_result(result)
    }

    /// Apply a partial update to a workflow
    pub async fn update_workflow(
        &self,
        workflow_id: &str,
        updates: &WorkflowUpdate,
        credentials: Option<&Credentials>,
    ) -> ToolOutcome {
        let result = match credentials {
            Some(creds) => self.rest(creds).update_workflow(workflow_id, updates).await,
            None => {
                let mut arguments = match serde_json::to_value(updates) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) | Err(_) => serde_json::Map::new(),
                };
                arguments.retain(|_, v| !v.is_null());
                arguments.insert("id".to_string(), json!(workflow_id));
                self.mcp
                    .call_tool("n8n_update_workflow", Value::Object(arguments))
                    .await
                    .map(unwrap_object)
            }
        };
        ToolOutcome::from_result(result)
    }

    /// Execute a workflow
    ///
    /// When credentials are present the direct API is tried first; any
    /// failure on that path logs a warning and retries the same operation
    /// over the session protocol rather than surfacing the failure.
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        input: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> ToolOutcome {
        if let Some(creds) = credentials {
            match self
                .rest(creds)
                .execute_workflow(workflow_id, input.clone())
                .await
            {
                Ok(data) => return ToolOutcome::success(data),
                Err(e) => {
                    warn!(
                        workflow_id = %workflow_id,
                        error = %e,
                        "direct execution failed, falling back to session protocol"
                    );
                }
            }
        }

        ToolOutcome::from_result(self.execute_via_mcp(workflow_id, input).await)
    }

    async fn execute_via_mcp(&self, workflow_id: &str, input: Option<Value>) -> Result<Value> {
        let mut arguments = json!({"id": workflow_id});
        if let Some(data) = input {
            arguments["data"] = data;
        }
        self.mcp
            .call_tool("n8n_test_workflow", arguments)
            .await
            .map(unwrap_object)
    }

    /// List execution history, optionally scoped to one workflow
    pub async fn list_executions(
        &self,
        workflow_id: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> ToolOutcome {
        let result = match credentials {
            Some(creds) => self.rest(creds).list_executions(workflow_id).await,
            None => {
                let mut arguments = json!({});
                if let Some(id) = workflow_id {
                    arguments["workflowId"] = json!(id);
                }
                self.mcp
                    .call_tool("n8n_executions", arguments)
                    .await
                    .map(|v| ListEnvelope::decode(v).into_items())
            }
        };
        ToolOutcome::from_result(result.map(Value::Array))
    }

    /// Probe backend reachability, never failing
    pub async fn check_connection(&self, credentials: Option<&Credentials>) -> bool {
        match credentials {
            Some(creds) => self.rest(creds).check_connection().await,
            None => self.mcp.check_connection().await,
        }
    }
}

/// Resolve the connection graph for a create call
///
/// An absent or empty mapping triggers linear auto-connection over the
/// node names, in order. Fewer than two named nodes yields an empty graph.
fn resolve_connections(nodes: &[Value], connections: Option<Value>) -> Value {
    match connections {
        Some(Value::Object(map)) if map.is_empty() => {}
        Some(other) if other.is_null() => {}
        Some(other) => return other,
        None => {}
    }

    let names: Vec<&str> = nodes
        .iter()
        .filter_map(|node| node.get("name").and_then(Value::as_str))
        .collect();
    if names.len() < 2 {
        return json!({});
    }

    debug!(node_count = names.len(), "synthesizing linear connection chain");
    serde_json::to_value(linear_chain_names(&names)).unwrap_or_else(|_| json!({}))
}

/// Merge locally-derived presentation fields into fetched node docs
fn decorate_node(node_type: &str, docs: Value) -> Value {
    let mut merged = match docs {
        Value::Object(map) => Value::Object(map),
        other => json!({"documentation": other}),
    };

    if let Some(text) = merged.get("description").and_then(Value::as_str) {
        let truncated = catalog::truncate_description(text, catalog::NODE_DESCRIPTION_CHARS_MAX);
        merged["description"] = json!(truncated);
    }
    merged["nodeType"] = json!(node_type);
    merged["displayName"] = json!(catalog::display_name(node_type));
    merged["category"] = json!(catalog::category(node_type));
    merged["icon"] = json!(catalog::icon(node_type));
    merged["popularity"] = json!(catalog::popularity(node_type));
    merged
}
