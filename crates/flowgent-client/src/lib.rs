//! Flowgent client - dual-transport n8n tool-calling layer
//!
//! TigerStyle: Two wire protocols, one facade, explicit normalization.
//!
//! # Overview
//!
//! This crate provides:
//! - McpClient: session-protocol transport (JSON-RPC over HTTP with
//!   SSE-framed responses and a rotating session token)
//! - RestClient: direct n8n REST transport using user-supplied credentials
//! - WorkflowService: the unified facade both the agent loop and the API
//!   routes consume, with transport selection and the execute-path fallback
//! - Envelope normalization, the workflow data model with linear
//!   auto-connection, and node presentation tables
//!
//! # Example
//!
//! ```rust,ignore
//! use flowgent_client::{McpClient, WorkflowService};
//! use flowgent_core::McpSettings;
//!
//! let mcp = Arc::new(McpClient::new(McpSettings::from_env(), http.clone()));
//! let service = WorkflowService::new(mcp, http);
//! let outcome = service.list_workflows(None).await;
//! ```

pub mod catalog;
pub mod credentials;
pub mod envelope;
pub mod facade;
pub mod http_client;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod sim;
pub mod workflow;

pub use credentials::Credentials;
pub use facade::{ToolOutcome, WorkflowService};
pub use http_client::{default_http_client, ReqwestHttpClient};
pub use rest::RestClient;
pub use session::McpClient;
pub use sim::SimHttpClient;
pub use workflow::{ConnectionTarget, Connections, Execution, Node, Workflow, WorkflowUpdate};
