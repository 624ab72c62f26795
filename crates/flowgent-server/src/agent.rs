//! Conversational agent for workflow operations
//!
//! TigerStyle: One tool round per turn, failures become chat text.
//!
//! Talks to an OpenAI-compatible chat completion endpoint through the same
//! `HttpClient` seam as the transports, declaring the facade operations as
//! function tools. A turn runs at most one tool round: completion, the
//! first requested tool call, then a follow-up completion with the tool
//! result. Nothing on this path returns an error to the route; a missing
//! API key or an upstream failure degrades to an explanatory assistant
//! message.

use flowgent_client::{Credentials, WorkflowService, WorkflowUpdate};
use flowgent_core::http::{HttpClient, HttpRequest};
use flowgent_core::LlmSettings;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// System prompt for the workflow assistant
const SYSTEM_PROMPT: &str = "You are Flowgent, an assistant that helps users build and manage \
n8n automation workflows. You can list, inspect, create, update and execute workflows, look up \
node documentation, and search the node catalog. When creating workflows, generate complete \
node definitions with sensible parameters; connections may be omitted for simple linear flows. \
Explain what you did in plain language and keep responses concise.";

/// Message shown when no LLM key is configured
const LLM_UNCONFIGURED_MESSAGE: &str = "The assistant is not configured yet: set GEMINI_API_KEY \
(or FLOWGENT_LLM_API_KEY) in the server environment and restart. Direct workflow endpoints \
still work without it.";

/// Result of one conversation turn
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Assistant text for the user
    pub response: String,
    /// Name of the tool the turn invoked, if any
    pub action: Option<String>,
    /// Workflow JSON when the turn created one
    pub workflow_data: Option<Value>,
}

impl ChatTurn {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            action: None,
            workflow_data: None,
        }
    }
}

// OpenAI-compatible wire types.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: WireMessage,
}

/// The conversational agent
pub struct Agent {
    settings: Option<LlmSettings>,
    service: Arc<WorkflowService>,
    http: Arc<dyn HttpClient>,
}

impl Agent {
    pub fn new(
        settings: Option<LlmSettings>,
        service: Arc<WorkflowService>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            settings,
            service,
            http,
        }
    }

    /// Whether an LLM endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    /// Run one conversation turn
    pub async fn chat(
        &self,
        message: &str,
        context: Option<&Value>,
        credentials: Option<&Credentials>,
    ) -> ChatTurn {
        let Some(settings) = &self.settings else {
            warn!("chat requested but no LLM key is configured");
            return ChatTurn::text(LLM_UNCONFIGURED_MESSAGE);
        };

        let user_content = match context {
            Some(ctx) => format!("Context: {ctx}\n\nUser message: {message}"),
            None => message.to_string(),
        };

        let mut messages = vec![
            WireMessage::new("system", SYSTEM_PROMPT),
            WireMessage::new("user", user_content),
        ];

        let first = match self.complete(settings, &messages).await {
            Ok(reply) => reply,
            Err(reason) => {
                error!(error = %reason, "LLM completion failed");
                return ChatTurn::text(format!("I encountered an error: {reason}"));
            }
        };

        let Some(call) = first.tool_calls.as_ref().and_then(|calls| calls.first()) else {
            return ChatTurn::text(first.content.unwrap_or_default());
        };

        // One tool round: run the first requested call, hand the result
        // back, and take the follow-up text as the answer.
        let call = call.clone();
        let arguments: Value =
            serde_json::from_str(&call.function.arguments).unwrap_or_else(|_| json!({}));
        debug!(tool = %call.function.name, "agent tool call");

        let outcome = self
            .dispatch_tool(&call.function.name, &arguments, credentials)
            .await;

        let workflow_data = if call.function.name == "create_workflow" {
            outcome.get("data").filter(|v| !v.is_null()).cloned()
        } else {
            None
        };

        messages.push(first);
        messages.push(WireMessage {
            role: "tool".to_string(),
            content: Some(outcome.to_string()),
            tool_calls: None,
            tool_call_id: Some(call.id.clone()),
        });

        let response = match self.complete(settings, &messages).await {
            Ok(reply) => reply.content.unwrap_or_default(),
            Err(reason) => {
                error!(error = %reason, "LLM follow-up failed");
                format!("I ran {} but could not summarize the result: {reason}", call.function.name)
            }
        };

        ChatTurn {
            response,
            action: Some(call.function.name),
            workflow_data,
        }
    }

    async fn complete(
        &self,
        settings: &LlmSettings,
        messages: &[WireMessage],
    ) -> Result<WireMessage, String> {
        let body = json!({
            "model": settings.model,
            "messages": messages,
            "max_tokens": settings.max_tokens,
            "tools": tool_definitions(),
        });

        let request = HttpRequest::post(format!("{}/chat/completions", settings.base_url))
            .with_header("Authorization", format!("Bearer {}", settings.api_key))
            .with_json_body(&body);

        let response = self.http.execute(request).await.map_err(|e| e.to_string())?;

        if !response.is_success() {
            return Err(format!("LLM API error {}: {}", response.status, response.body));
        }

        let completion: CompletionResponse = response
            .json()
            .and_then(serde_json::from_value)
            .map_err(|e| format!("invalid completion payload: {e}"))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| "no completion choices returned".to_string())
    }

    /// Route a tool call to the facade
    ///
    /// Unknown tools and missing required arguments come back as error
    /// payloads for the model to read, never as Rust errors.
    pub async fn dispatch_tool(
        &self,
        name: &str,
        arguments: &Value,
        credentials: Option<&Credentials>,
    ) -> Value {
        let outcome = match name {
            "list_workflows" => self.service.list_workflows(credentials).await,
            "get_workflow" => match required_str(arguments, "workflow_id") {
                Ok(id) => self.service.get_workflow(id, credentials).await,
                Err(e) => return e,
            },
            "create_workflow" => {
                let workflow_name = match required_str(arguments, "name") {
                    Ok(n) => n,
                    Err(e) => return e,
                };
                let nodes = arguments
                    .get("nodes")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let connections = arguments.get("connections").cloned();
                self.service
                    .create_workflow(workflow_name, nodes, connections, credentials)
                    .await
            }
            "update_workflow" => {
                let id = match required_str(arguments, "workflow_id") {
                    Ok(id) => id,
                    Err(e) => return e,
                };
                let updates = WorkflowUpdate {
                    name: arguments
                        .get("name")
                        .and_then(Value::as_str)
                        .map(String::from),
                    nodes: arguments.get("nodes").and_then(Value::as_array).cloned(),
                    connections: arguments
                        .get("connections")
                        .filter(|v| !v.is_null())
                        .cloned(),
                    active: arguments.get("active").and_then(Value::as_bool),
                };
                self.service.update_workflow(id, &updates, credentials).await
            }
            "execute_workflow" => match required_str(arguments, "workflow_id") {
                Ok(id) => {
                    let input = arguments.get("input_data").filter(|v| !v.is_null()).cloned();
                    self.service.execute_workflow(id, input, credentials).await
                }
                Err(e) => return e,
            },
            "get_node_info" => match required_str(arguments, "node_type") {
                Ok(node_type) => self.service.get_node_info(node_type).await,
                Err(e) => return e,
            },
            "search_nodes" => match required_str(arguments, "query") {
                Ok(query) => {
                    let limit = arguments
                        .get("limit")
                        .and_then(Value::as_u64)
                        .map(|n| n as u32);
                    self.service.search_nodes(query, limit).await
                }
                Err(e) => return e,
            },
            "list_executions" => {
                let workflow_id = arguments.get("workflow_id").and_then(Value::as_str);
                self.service.list_executions(workflow_id, credentials).await
            }
            other => {
                warn!(tool = %other, "model requested unknown tool");
                return json!({"status": "error", "message": format!("unknown tool: {other}")});
            }
        };
        outcome.into_value()
    }
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, Value> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| json!({"status": "error", "message": format!("missing argument: {key}")}))
}

/// Function tool declarations for the completion request
fn tool_definitions() -> Vec<Value> {
    let function = |name: &str, description: &str, parameters: Value| {
        json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": parameters,
            }
        })
    };

    vec![
        function(
            "list_workflows",
            "Get all workflows from the n8n instance",
            json!({"type": "object", "properties": {}}),
        ),
        function(
            "get_workflow",
            "Get a specific workflow by ID with full details",
            json!({
                "type": "object",
                "properties": {
                    "workflow_id": {"type": "string", "description": "The ID of the workflow"}
                },
                "required": ["workflow_id"]
            }),
        ),
        function(
            "create_workflow",
            "Create a new n8n workflow from a JSON definition. Connections may be omitted \
             for linear flows; they will be chained in node order.",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Name of the workflow"},
                    "nodes": {"type": "array", "description": "Array of workflow nodes",
                              "items": {"type": "object"}},
                    "connections": {"type": "object", "description": "Node connections mapping"}
                },
                "required": ["name", "nodes"]
            }),
        ),
        function(
            "update_workflow",
            "Update an existing workflow. Only provided fields change; the rest are preserved.",
            json!({
                "type": "object",
                "properties": {
                    "workflow_id": {"type": "string"},
                    "name": {"type": "string"},
                    "nodes": {"type": "array", "items": {"type": "object"}},
                    "connections": {"type": "object"},
                    "active": {"type": "boolean"}
                },
                "required": ["workflow_id"]
            }),
        ),
        function(
            "execute_workflow",
            "Execute a workflow with optional input data",
            json!({
                "type": "object",
                "properties": {
                    "workflow_id": {"type": "string"},
                    "input_data": {"type": "object", "description": "Optional input data"}
                },
                "required": ["workflow_id"]
            }),
        ),
        function(
            "get_node_info",
            "Get detailed information about a specific n8n node type",
            json!({
                "type": "object",
                "properties": {
                    "node_type": {"type": "string",
                                  "description": "e.g. 'n8n-nodes-base.httpRequest'"}
                },
                "required": ["node_type"]
            }),
        ),
        function(
            "search_nodes",
            "Search the n8n node catalog by keyword",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "limit": {"type": "integer"}
                },
                "required": ["query"]
            }),
        ),
        function(
            "list_executions",
            "List recent workflow executions, optionally filtered by workflow",
            json!({
                "type": "object",
                "properties": {
                    "workflow_id": {"type": "string"}
                }
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgent_client::{McpClient, SimHttpClient};
    use flowgent_core::http::HttpResponse;
    use flowgent_core::McpSettings;

    fn agent(sim: &Arc<SimHttpClient>, settings: Option<LlmSettings>) -> Agent {
        let http: Arc<dyn HttpClient> = sim.clone();
        let mcp = Arc::new(McpClient::new(
            McpSettings {
                url: "https://mcp.test/mcp".to_string(),
                api_key: "token".to_string(),
            },
            http.clone(),
        ));
        let service = Arc::new(WorkflowService::new(mcp, http.clone()));
        Agent::new(settings, service, http)
    }

    fn llm_settings() -> LlmSettings {
        LlmSettings {
            base_url: "https://llm.test/v1".to_string(),
            api_key: "llm-key".to_string(),
            model: "test-model".to_string(),
            max_tokens: 256,
        }
    }

    fn completion(message: Value) -> HttpResponse {
        HttpResponse::new(200, json!({"choices": [{"message": message}]}).to_string())
    }

    #[tokio::test]
    async fn test_chat_without_key_degrades_to_remediation() {
        let sim = Arc::new(SimHttpClient::new());
        let turn = agent(&sim, None).chat("hello", None, None).await;

        assert!(turn.response.contains("GEMINI_API_KEY"));
        assert!(turn.action.is_none());
        assert_eq!(sim.request_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_plain_text_turn() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_response(completion(
            json!({"role": "assistant", "content": "Hello there"}),
        ));

        let turn = agent(&sim, Some(llm_settings())).chat("hi", None, None).await;
        assert_eq!(turn.response, "Hello there");
        assert!(turn.action.is_none());

        let request = sim.last_request().unwrap();
        assert_eq!(request.url, "https://llm.test/v1/chat/completions");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["tools"].as_array().unwrap().len() >= 5);
    }

    #[tokio::test]
    async fn test_chat_runs_one_tool_round() {
        let sim = Arc::new(SimHttpClient::new());
        // 1) completion requesting a tool call
        sim.push_response(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call-1",
                "type": "function",
                "function": {"name": "list_workflows", "arguments": "{}"}
            }]
        })));
        // 2) MCP handshake + 3) tool call for the facade
        sim.push_response(HttpResponse::new(
            200,
            json!({"jsonrpc": "2.0", "id": 1, "result": {"serverInfo": {}}}).to_string(),
        ));
        sim.push_response(HttpResponse::new(
            200,
            json!({"jsonrpc": "2.0", "id": 2, "result": {
                "content": [{"type": "text", "text": json!({"workflows": [{"id": "1"}]}).to_string()}]
            }})
            .to_string(),
        ));
        // 4) follow-up completion with the tool result
        sim.push_response(completion(
            json!({"role": "assistant", "content": "You have one workflow."}),
        ));

        let turn = agent(&sim, Some(llm_settings()))
            .chat("what workflows do I have?", None, None)
            .await;

        assert_eq!(turn.response, "You have one workflow.");
        assert_eq!(turn.action.as_deref(), Some("list_workflows"));
        assert!(turn.workflow_data.is_none());

        // The follow-up carried the tool result message.
        let requests = sim.requests();
        assert_eq!(requests.len(), 4);
        let follow_up: Value =
            serde_json::from_str(requests[3].body.as_deref().unwrap()).unwrap();
        let last_message = follow_up["messages"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last_message["role"], "tool");
        assert_eq!(last_message["tool_call_id"], "call-1");
        assert!(last_message["content"]
            .as_str()
            .unwrap()
            .contains("success"));
    }

    #[tokio::test]
    async fn test_chat_surfaces_workflow_data_on_create() {
        let sim = Arc::new(SimHttpClient::new());
        let arguments = json!({
            "name": "Ping",
            "nodes": [{"name": "A"}, {"name": "B"}],
        })
        .to_string();
        sim.push_response(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call-2",
                "type": "function",
                "function": {"name": "create_workflow", "arguments": arguments}
            }]
        })));
        sim.push_response(HttpResponse::new(
            200,
            json!({"jsonrpc": "2.0", "id": 1, "result": {"serverInfo": {}}}).to_string(),
        ));
        sim.push_response(HttpResponse::new(
            200,
            json!({"jsonrpc": "2.0", "id": 2, "result": {
                "content": [{"type": "text", "text": json!({"id": "wf-9", "name": "Ping"}).to_string()}]
            }})
            .to_string(),
        ));
        sim.push_response(completion(
            json!({"role": "assistant", "content": "Created the Ping workflow."}),
        ));

        let turn = agent(&sim, Some(llm_settings()))
            .chat("make a ping workflow", None, None)
            .await;

        assert_eq!(turn.action.as_deref(), Some("create_workflow"));
        assert_eq!(turn.workflow_data.unwrap()["id"], "wf-9");
    }

    #[tokio::test]
    async fn test_chat_llm_failure_becomes_text() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_response(HttpResponse::new(429, "rate limited"));

        let turn = agent(&sim, Some(llm_settings())).chat("hi", None, None).await;
        assert!(turn.response.contains("I encountered an error"));
        assert!(turn.response.contains("429"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let sim = Arc::new(SimHttpClient::new());
        let result = agent(&sim, None)
            .dispatch_tool("drop_database", &json!({}), None)
            .await;
        assert_eq!(result["status"], "error");
        assert_eq!(sim.request_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_missing_argument() {
        let sim = Arc::new(SimHttpClient::new());
        let result = agent(&sim, None)
            .dispatch_tool("get_workflow", &json!({}), None)
            .await;
        assert_eq!(result["status"], "error");
        assert!(result["message"].as_str().unwrap().contains("workflow_id"));
    }
}
