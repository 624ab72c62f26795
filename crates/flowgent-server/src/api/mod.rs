//! REST API module
//!
//! TigerStyle: Routes are thin; outcomes map to status codes in one place.

pub mod chat;
pub mod nodes;
pub mod workflows;

use crate::models::{ErrorResponse, HealthResponse};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use flowgent_client::facade::ToolOutcome;
use flowgent_client::Credentials;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Header carrying the n8n instance URL
pub const INSTANCE_URL_HEADER: &str = "x-n8n-instance-url";

/// Header carrying the n8n API key
pub const API_KEY_HEADER: &str = "x-n8n-api-key";

/// Create the API router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/chat", post(chat::chat))
        .route("/api/workflows", get(workflows::list_workflows))
        .route("/api/workflows/:id", get(workflows::get_workflow))
        .route("/api/execute", post(workflows::execute_workflow))
        .route("/api/executions", get(workflows::list_executions))
        .route("/api/node-info/:node_type", get(nodes::node_info))
        .route("/api/node-preview/:node_type", get(nodes::node_preview))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "flowgent",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint, probing the session backend
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mcp_connected = state.service.check_connection(None).await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mcp_connected,
    })
}

/// Resolve credentials for a request
///
/// The body value wins when present and complete; otherwise the pair of
/// custom headers is tried. Both paths produce the same `Credentials`.
pub fn resolve_credentials(
    headers: &HeaderMap,
    body: Option<Credentials>,
) -> Option<Credentials> {
    if let Some(creds) = body.filter(Credentials::is_complete) {
        return Some(creds);
    }
    let url = headers
        .get(INSTANCE_URL_HEADER)
        .and_then(|v| v.to_str().ok());
    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    Credentials::from_parts(url, key)
}

/// API error type that converts to HTTP responses
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::new("not_found", message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorResponse::upstream(message),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse::internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Unwrap a facade outcome into its success payload or an HTTP error
///
/// NotFound maps to 404; transport errors map to 502 since the failure
/// happened upstream of this server.
pub fn require_success(outcome: ToolOutcome) -> Result<Value, ApiError> {
    match outcome {
        ToolOutcome::Success { data } => Ok(data),
        ToolOutcome::NotFound { message } => Err(ApiError::not_found(message)),
        ToolOutcome::Error { message } => Err(ApiError::upstream(message)),
    }
}
