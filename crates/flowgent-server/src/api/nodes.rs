//! Node catalog endpoints

use super::{require_success, ApiError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::instrument;

/// Fetch node documentation with presentation fields merged in
#[instrument(skip_all, fields(node_type = %node_type))]
pub async fn node_info(
    State(state): State<AppState>,
    Path(node_type): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let data = require_success(state.service.get_node_info(&node_type).await)?;
    Ok(Json(data))
}

/// Build a preview card from the local tables only
pub async fn node_preview(
    State(state): State<AppState>,
    Path(node_type): Path<String>,
) -> Json<Value> {
    Json(state.service.node_preview(&node_type, None))
}
