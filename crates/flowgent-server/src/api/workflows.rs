//! Workflow and execution endpoints

use super::{require_success, resolve_credentials, ApiError};
use crate::models::{ExecuteRequest, ExecutionResponse, WorkflowListItem};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecutionsQuery {
    #[serde(default)]
    pub workflow_id: Option<String>,
}

/// List all workflows on the selected backend
#[instrument(skip_all)]
pub async fn list_workflows(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WorkflowListItem>>, ApiError> {
    let credentials = resolve_credentials(&headers, None);
    let data = require_success(state.service.list_workflows(credentials.as_ref()).await)?;

    let items = data
        .as_array()
        .map(|workflows| workflows.iter().map(WorkflowListItem::from_value).collect())
        .unwrap_or_default();
    Ok(Json(items))
}

/// Get a workflow with full details
#[instrument(skip_all, fields(workflow_id = %workflow_id))]
pub async fn get_workflow(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(workflow_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let credentials = resolve_credentials(&headers, None);
    let data = require_success(
        state
            .service
            .get_workflow(&workflow_id, credentials.as_ref())
            .await,
    )?;
    Ok(Json(data))
}

/// Execute a workflow with optional input data
#[instrument(skip_all, fields(workflow_id = %request.workflow_id))]
pub async fn execute_workflow(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecutionResponse>, ApiError> {
    if request.workflow_id.trim().is_empty() {
        return Err(ApiError::bad_request("workflow_id must not be empty"));
    }
    let credentials = resolve_credentials(&headers, request.credentials.clone());

    let data = require_success(
        state
            .service
            .execute_workflow(
                &request.workflow_id,
                request.input_data.clone(),
                credentials.as_ref(),
            )
            .await,
    )?;
    Ok(Json(ExecutionResponse::from_value(&data)))
}

/// List execution history, optionally filtered by workflow
#[instrument(skip_all)]
pub async fn list_executions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ExecutionsQuery>,
) -> Result<Json<Value>, ApiError> {
    let credentials = resolve_credentials(&headers, None);
    let data = require_success(
        state
            .service
            .list_executions(query.workflow_id.as_deref(), credentials.as_ref())
            .await,
    )?;
    Ok(Json(data))
}
