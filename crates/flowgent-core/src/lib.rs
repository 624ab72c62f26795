//! Flowgent core types
//!
//! TigerStyle: Small, dependency-light foundation shared by every crate.
//!
//! This crate provides:
//! - Error taxonomy for the client and server layers
//! - HttpClient trait abstraction (production impl lives in flowgent-client)
//! - Environment-level configuration with explicit defaults and validation

pub mod config;
pub mod error;
pub mod http;

pub use config::{LlmSettings, McpSettings, ServerSettings};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult};
