//! Flowgent server
//!
//! TigerStyle: Thin HTTP surface, explicit dependency injection.
//!
//! The server owns one [`state::AppState`] holding the workflow facade and
//! the chat agent; handlers clone it via axum state. All backend access
//! goes through the facade, so routes never see a raw transport.

pub mod agent;
pub mod api;
pub mod models;
pub mod state;
