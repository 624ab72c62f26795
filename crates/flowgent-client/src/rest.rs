//! Direct-REST transport
//!
//! TigerStyle: One request per operation, explicit status mapping.
//!
//! Speaks the n8n public API (`{instance_url}/api/v1`) with a per-instance
//! API key. Update is read-modify-write: the full replacement payload is
//! assembled from the fetched current workflow plus the caller's changes,
//! so omitted fields are never cleared. There is no optimistic concurrency
//! token at this boundary; a concurrent external write between the read
//! and the PUT is silently overwritten.

use crate::envelope::{unwrap_object, ListEnvelope};
use crate::workflow::WorkflowUpdate;
use flowgent_core::http::{HttpClient, HttpRequest};
use flowgent_core::{Error, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// n8n API version path segment
const API_BASE_PATH: &str = "/api/v1";

/// API key header name
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Client for direct n8n API calls using user-provided credentials
pub struct RestClient {
    base_url: String,
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl RestClient {
    /// Create a client for the given instance
    ///
    /// Normalizes the URL by stripping a trailing slash and appending the
    /// fixed API version segment.
    pub fn new(
        instance_url: impl AsRef<str>,
        api_key: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let base_url = format!(
            "{}{}",
            instance_url.as_ref().trim_end_matches('/'),
            API_BASE_PATH
        );
        Self {
            base_url,
            api_key: api_key.into(),
            http,
        }
    }

    /// The normalized base URL (for logging/tests)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, request: HttpRequest) -> Result<Value> {
        let request = request.with_header(API_KEY_HEADER, self.api_key.clone());
        debug!(method = %request.method, url = %request.url, "n8n API request");

        let response = self.http.execute(request).await?;

        if !response.is_success() {
            let err = Error::http_status(response.status, &response.body);
            error!(status = response.status, error = %err, "n8n API error");
            return Err(err);
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        response
            .json()
            .map_err(|e| Error::malformed(format!("n8n API returned invalid JSON: {e}")))
    }

    /// List all workflows
    pub async fn list_workflows(&self) -> Result<Vec<Value>> {
        let result = self
            .request(HttpRequest::get(format!("{}/workflows", self.base_url)))
            .await?;
        Ok(ListEnvelope::decode(result).into_items())
    }

    /// Get a specific workflow; HTTP 404 becomes a NotFound error
    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        let result = self
            .request(HttpRequest::get(format!(
                "{}/workflows/{}",
                self.base_url, workflow_id
            )))
            .await
            .map_err(|e| match e {
                Error::HttpStatus { status: 404, .. } => {
                    Error::not_found("workflow", workflow_id)
                }
                other => other,
            })?;
        Ok(unwrap_object(result))
    }

    /// Create a new workflow, inactive by default
    pub async fn create_workflow(
        &self,
        name: &str,
        nodes: Vec<Value>,
        connections: Value,
    ) -> Result<Value> {
        let payload = json!({
            "name": name,
            "nodes": nodes,
            "connections": connections,
            "active": false,
            "settings": {},
        });
        let result = self
            .request(
                HttpRequest::post(format!("{}/workflows", self.base_url))
                    .with_json_body(&payload),
            )
            .await?;
        Ok(unwrap_object(result))
    }

    /// Update a workflow via read-modify-write
    ///
    /// Each of name/nodes/connections/active is taken from `updates` when
    /// present and non-null, otherwise from the fetched current value;
    /// `settings` is preserved verbatim.
    pub async fn update_workflow(&self, workflow_id: &str, updates: &WorkflowUpdate) -> Result<Value> {
        let current = self.get_workflow(workflow_id).await?;

        let name = updates
            .name
            .clone()
            .or_else(|| current.get("name").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| "Untitled".to_string());
        let nodes = updates
            .nodes
            .clone()
            .map(Value::Array)
            .or_else(|| current.get("nodes").cloned())
            .unwrap_or_else(|| json!([]));
        let connections = updates
            .connections
            .clone()
            .or_else(|| current.get("connections").cloned())
            .unwrap_or_else(|| json!({}));
        let active = updates
            .active
            .or_else(|| current.get("active").and_then(Value::as_bool))
            .unwrap_or(false);

        let mut payload = json!({
            "name": name,
            "nodes": nodes,
            "connections": connections,
            "active": active,
        });
        if let Some(settings) = current.get("settings") {
            payload["settings"] = settings.clone();
        }

        info!(
            workflow_id = %workflow_id,
            name = %payload["name"],
            node_count = payload["nodes"].as_array().map(Vec::len).unwrap_or(0),
            "updating workflow"
        );

        let result = self
            .request(
                HttpRequest::put(format!("{}/workflows/{}", self.base_url, workflow_id))
                    .with_json_body(&payload),
            )
            .await?;
        Ok(unwrap_object(result))
    }

    /// Execute a workflow with optional input data
    ///
    /// Fetches the workflow first to validate existence before posting to
    /// the run endpoint.
    pub async fn execute_workflow(&self, workflow_id: &str, input: Option<Value>) -> Result<Value> {
        self.get_workflow(workflow_id).await?;

        let body = input.unwrap_or_else(|| json!({}));
        let result = self
            .request(
                HttpRequest::post(format!("{}/workflows/{}/run", self.base_url, workflow_id))
                    .with_json_body(&body),
            )
            .await?;
        Ok(unwrap_object(result))
    }

    /// List execution history, optionally filtered by workflow
    pub async fn list_executions(&self, workflow_id: Option<&str>) -> Result<Vec<Value>> {
        let mut request = HttpRequest::get(format!("{}/executions", self.base_url));
        if let Some(id) = workflow_id {
            request = request.with_query(&[("workflowId", id)]);
        }
        let result = self.request(request).await?;
        Ok(ListEnvelope::decode(result).into_items())
    }

    /// Check if the n8n API is reachable, swallowing all errors
    pub async fn check_connection(&self) -> bool {
        let request = HttpRequest::get(format!("{}/workflows", self.base_url))
            .with_query(&[("limit", "1")]);
        match self.request(request).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "n8n connection check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHttpClient;
    use flowgent_core::http::{HttpMethod, HttpResponse};

    fn client(sim: &Arc<SimHttpClient>) -> RestClient {
        RestClient::new("https://n8n.example.com/", "key-123", sim.clone())
    }

    #[test]
    fn test_base_url_normalization() {
        let sim = Arc::new(SimHttpClient::new());
        let client = RestClient::new("https://n8n.example.com/", "k", sim);
        assert_eq!(client.base_url(), "https://n8n.example.com/api/v1");
    }

    #[tokio::test]
    async fn test_list_workflows_unwraps_data_envelope() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(200, &serde_json::json!({"data": [{"id": "1"}]}));

        let workflows = client(&sim).list_workflows().await.unwrap();
        assert_eq!(workflows.len(), 1);

        let request = sim.last_request().unwrap();
        assert_eq!(request.url, "https://n8n.example.com/api/v1/workflows");
        assert_eq!(
            request.headers.get(API_KEY_HEADER).map(String::as_str),
            Some("key-123")
        );
    }

    #[tokio::test]
    async fn test_list_workflows_accepts_bare_list() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(200, &serde_json::json!([{"id": "1"}, {"id": "2"}]));

        let workflows = client(&sim).list_workflows().await.unwrap();
        assert_eq!(workflows.len(), 2);
    }

    #[tokio::test]
    async fn test_get_workflow_maps_404_to_not_found() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_response(HttpResponse::new(404, r#"{"message":"not found"}"#));

        let err = client(&sim).get_workflow("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_workflow_propagates_other_statuses() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_response(HttpResponse::new(401, "unauthorized"));

        let err = client(&sim).get_workflow("wf-1").await.unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_create_workflow_defaults() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(200, &serde_json::json!({"id": "new"}));

        client(&sim)
            .create_workflow("My Flow", vec![], serde_json::json!({}))
            .await
            .unwrap();

        let request = sim.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "My Flow");
        assert_eq!(body["active"], false);
        assert_eq!(body["settings"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_update_preserves_omitted_fields() {
        let sim = Arc::new(SimHttpClient::new());
        let current = serde_json::json!({
            "id": "wf-1",
            "name": "Keep Me",
            "active": false,
            "nodes": [{"id": "n1", "name": "A", "type": "t", "typeVersion": 1,
                       "position": [0, 0], "parameters": {}}],
            "connections": {"A": {"main": [[]]}},
            "settings": {"timezone": "UTC"},
        });
        sim.push_json(200, &current);
        sim.push_json(200, &serde_json::json!({"id": "wf-1", "active": true}));

        let updates = WorkflowUpdate {
            active: Some(true),
            ..Default::default()
        };
        client(&sim).update_workflow("wf-1", &updates).await.unwrap();

        let put = sim.last_request().unwrap();
        assert_eq!(put.method, HttpMethod::Put);
        let body: Value = serde_json::from_str(put.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], current["name"]);
        assert_eq!(body["nodes"], current["nodes"]);
        assert_eq!(body["connections"], current["connections"]);
        assert_eq!(body["settings"], current["settings"]);
        assert_eq!(body["active"], true);
    }

    #[tokio::test]
    async fn test_update_applies_provided_fields() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(
            200,
            &serde_json::json!({"id": "wf-1", "name": "Old", "nodes": [], "connections": {}, "active": false}),
        );
        sim.push_json(200, &serde_json::json!({"id": "wf-1"}));

        let updates = WorkflowUpdate {
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        client(&sim).update_workflow("wf-1", &updates).await.unwrap();

        let body: Value =
            serde_json::from_str(sim.last_request().unwrap().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "New Name");
        assert_eq!(body["active"], false);
    }

    #[tokio::test]
    async fn test_execute_validates_existence_first() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(200, &serde_json::json!({"id": "wf-1", "nodes": []}));
        sim.push_json(200, &serde_json::json!({"id": "exec-1", "success": true}));

        let result = client(&sim)
            .execute_workflow("wf-1", Some(serde_json::json!({"in": 1})))
            .await
            .unwrap();
        assert_eq!(result["id"], "exec-1");

        let requests = sim.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].url.ends_with("/workflows/wf-1/run"));
        let body: Value = serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["in"], 1);
    }

    #[tokio::test]
    async fn test_list_executions_with_filter() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(200, &serde_json::json!({"data": []}));

        client(&sim).list_executions(Some("wf-7")).await.unwrap();
        assert_eq!(
            sim.last_request().unwrap().url,
            "https://n8n.example.com/api/v1/executions?workflowId=wf-7"
        );
    }

    #[tokio::test]
    async fn test_check_connection_swallows_errors() {
        let sim = Arc::new(SimHttpClient::new());
        sim.push_response(HttpResponse::new(500, "boom"));
        assert!(!client(&sim).check_connection().await);

        let sim = Arc::new(SimHttpClient::new());
        sim.push_json(200, &serde_json::json!({"data": []}));
        assert!(client(&sim).check_connection().await);
        assert!(sim.last_request().unwrap().url.ends_with("?limit=1"));
    }
}
