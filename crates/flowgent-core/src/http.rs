//! HTTP Client Abstraction
//!
//! TigerStyle: All outbound HTTP goes through an abstraction trait.
//!
//! This module provides the trait and value types; the production
//! reqwest implementation lives in flowgent-client, and tests use a
//! deterministic scripted client. Both transports (session-protocol and
//! direct REST) are written against this seam only.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default HTTP timeout in milliseconds
pub const HTTP_CLIENT_TIMEOUT_MS_DEFAULT: u64 = 30_000;

/// Maximum response body size in bytes
pub const HTTP_CLIENT_RESPONSE_BYTES_MAX: u64 = 10 * 1024 * 1024; // 10MB

// =============================================================================
// HTTP Method
// =============================================================================

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

// =============================================================================
// HTTP Request
// =============================================================================

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (for POST/PUT/PATCH)
    pub body: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl HttpRequest {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: Duration::from_millis(HTTP_CLIENT_TIMEOUT_MS_DEFAULT),
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Create a new POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Create a new PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Set request body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body and Content-Type
    pub fn with_json_body(mut self, json: &Value) -> Self {
        self.body = Some(json.to_string());
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append query pairs to the URL, percent-encoding the values
    pub fn with_query(mut self, pairs: &[(&str, &str)]) -> Self {
        if pairs.is_empty() {
            return self;
        }
        let mut url = self.url;
        for (i, (key, value)) in pairs.iter().enumerate() {
            url.push(if i == 0 && !url.contains('?') { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.extend(url::form_urlencoded::byte_serialize(value.as_bytes()));
        }
        self.url = url;
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// HTTP Response
// =============================================================================

/// HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse body as JSON
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Look up a header by name, case-insensitively
    ///
    /// Session-protocol servers are free to spell `Mcp-Session-Id` however
    /// they like, so exact-key lookup is not enough.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// =============================================================================
// HTTP Error
// =============================================================================

/// HTTP client errors
#[derive(Debug, Clone)]
pub enum HttpError {
    /// Request timed out
    Timeout { timeout_ms: u64 },
    /// Connection failed
    ConnectionFailed { reason: String },
    /// Request failed
    RequestFailed { reason: String },
    /// Response too large
    ResponseTooLarge { size: u64, max: u64 },
    /// Invalid URL
    InvalidUrl { url: String },
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Timeout { timeout_ms } => {
                write!(f, "HTTP request timed out after {}ms", timeout_ms)
            }
            HttpError::ConnectionFailed { reason } => {
                write!(f, "HTTP connection failed: {}", reason)
            }
            HttpError::RequestFailed { reason } => write!(f, "HTTP request failed: {}", reason),
            HttpError::ResponseTooLarge { size, max } => {
                write!(
                    f,
                    "HTTP response too large: {} bytes (max: {} bytes)",
                    size, max
                )
            }
            HttpError::InvalidUrl { url } => write!(f, "Invalid URL: {}", url),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<HttpError> for crate::error::Error {
    fn from(err: HttpError) -> Self {
        crate::error::Error::Transport {
            reason: err.to_string(),
        }
    }
}

/// HTTP client result type
pub type HttpResult<T> = Result<T, HttpError>;

// =============================================================================
// HTTP Client Trait
// =============================================================================

/// Abstract HTTP client trait
///
/// Production code uses ReqwestHttpClient (in flowgent-client),
/// tests use SimHttpClient with scripted responses.
///
/// 4xx/5xx statuses are NOT errors at this layer; callers inspect
/// `HttpResponse::status` so that, e.g., 404 and 401 can be mapped to
/// distinct domain errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request
    async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse>;

    /// Convenience method for GET requests
    async fn get(&self, url: &str) -> HttpResult<HttpResponse> {
        self.execute(HttpRequest::get(url)).await
    }

    /// Convenience method for POST with JSON body
    async fn post_json(&self, url: &str, body: &Value) -> HttpResult<HttpResponse> {
        self.execute(HttpRequest::post(url).with_json_body(body))
            .await
    }
}
