//! Error types for Flowgent
//!
//! TigerStyle: Explicit error variants with context, using thiserror.
//!
//! The taxonomy deliberately separates "the workflow does not exist"
//! (NotFound) from "the wire call failed" (Transport/HttpStatus) from
//! "the remote answered nonsense" (Malformed), so callers never have to
//! string-match error messages to tell them apart.

use thiserror::Error;

/// Result type alias for Flowgent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum response-body bytes carried inside an error (and logged)
pub const ERROR_BODY_BYTES_MAX: usize = 200;

/// Flowgent error types
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    #[error("upstream returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("protocol error: {message}")]
    Protocol { message: String },

    #[error("session initialization failed: {reason}")]
    SessionInit { reason: String },

    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("invalid configuration: {field}, reason: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Create a not-found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a transport failure error
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Create an HTTP status error, truncating the body to the carry limit
    pub fn http_status(status: u16, body: &str) -> Self {
        let body = if body.len() > ERROR_BODY_BYTES_MAX {
            let mut end = ERROR_BODY_BYTES_MAX;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body[..end].to_string()
        } else {
            body.to_string()
        };
        Self::HttpStatus { status, body }
    }

    /// Create a protocol error (JSON-RPC error member)
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Create an invalid-configuration error
    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Check if this error means the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::HttpStatus { status: 404, .. }
        )
    }

    /// Check if this error is an upstream authentication failure
    ///
    /// Explicit status-code check; never derived from message text.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }

    /// Check if this error stems from missing or invalid configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("workflow", "wf-123");
        assert!(err.to_string().contains("wf-123"));
        assert!(err.to_string().contains("workflow"));
    }

    #[test]
    fn test_http_status_truncates_body() {
        let body = "x".repeat(5000);
        let err = Error::http_status(500, &body);
        match err {
            Error::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), ERROR_BODY_BYTES_MAX);
            }
            _ => panic!("expected HttpStatus"),
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found("workflow", "w1").is_not_found());
        assert!(Error::http_status(404, "missing").is_not_found());
        assert!(!Error::http_status(500, "boom").is_not_found());
    }

    #[test]
    fn test_is_auth_failure_by_status_only() {
        assert!(Error::http_status(401, "unauthorized").is_auth_failure());
        assert!(Error::http_status(403, "forbidden").is_auth_failure());
        assert!(!Error::http_status(500, "401 mentioned in body").is_auth_failure());
        assert!(!Error::transport("contains 403 text").is_auth_failure());
    }

    #[test]
    fn test_is_configuration() {
        let err = Error::invalid_configuration("N8N_MCP_API_KEY", "not set");
        assert!(err.is_configuration());
        assert!(!Error::internal("oops").is_configuration());
    }
}
