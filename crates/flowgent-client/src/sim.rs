//! Simulated HTTP client for deterministic tests
//!
//! TigerStyle: Scripted responses, recorded requests, zero network.
//!
//! Responses are consumed FIFO; every executed request is recorded so tests
//! can assert on headers (session token attachment, auth headers) and
//! bodies (JSON-RPC envelopes, read-modify-write payloads).

use async_trait::async_trait;
use flowgent_core::http::{HttpClient, HttpError, HttpRequest, HttpResponse, HttpResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic HTTP client with scripted responses
pub struct SimHttpClient {
    responses: Mutex<VecDeque<HttpResult<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl SimHttpClient {
    /// Create an empty sim client (every request fails until scripted)
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a JSON response with the given status
    pub fn push_json(&self, status: u16, body: &serde_json::Value) {
        self.push_response(
            HttpResponse::new(status, body.to_string())
                .with_header("Content-Type", "application/json"),
        );
    }

    /// Queue a transport-level failure
    pub fn push_error(&self, error: HttpError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// All requests executed so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests executed
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for SimHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for SimHttpClient {
    async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(HttpError::RequestFailed {
                    reason: "no scripted response".to_string(),
                })
            })
    }
}
