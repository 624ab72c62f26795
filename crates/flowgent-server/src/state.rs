//! Application state
//!
//! TigerStyle: Everything a handler needs arrives through this struct.
//!
//! Constructed once in main (or per test) with explicitly injected
//! clients; there are no process-wide singletons to reach for.

use crate::agent::Agent;
use flowgent_client::WorkflowService;
use std::sync::Arc;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// The dual-transport workflow facade
    pub service: Arc<WorkflowService>,
    /// The conversational agent
    pub agent: Arc<Agent>,
}

impl AppState {
    pub fn new(service: Arc<WorkflowService>, agent: Arc<Agent>) -> Self {
        Self { service, agent }
    }
}
