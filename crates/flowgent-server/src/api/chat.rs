//! Chat endpoint

use super::resolve_credentials;
use crate::models::{ChatRequest, ChatResponse};
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use tracing::instrument;

/// Run one conversation turn with the assistant
///
/// Never returns an HTTP error for backend failures: the agent folds them
/// into the assistant message so the conversation can continue.
#[instrument(skip_all, fields(message_len = request.message.len()))]
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let credentials = resolve_credentials(&headers, request.credentials.clone());

    let turn = state
        .agent
        .chat(
            &request.message,
            request.context.as_ref(),
            credentials.as_ref(),
        )
        .await;

    Json(ChatResponse {
        response: turn.response,
        workflow_data: turn.workflow_data,
        action: turn.action,
    })
}
