//! Configuration for Flowgent
//!
//! TigerStyle: Explicit defaults, validation, no panics on missing env.
//!
//! A missing API key is a user-visible configuration error surfaced at
//! first use, never a process crash.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Default session-protocol (MCP) endpoint
pub const MCP_URL_DEFAULT: &str = "https://api.n8n-mcp.com/mcp";

/// Default LLM endpoint (OpenAI-compatible)
pub const LLM_BASE_URL_DEFAULT: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default LLM model
pub const LLM_MODEL_DEFAULT: &str = "gemini-2.0-flash";

/// Default max output tokens per completion
pub const LLM_MAX_TOKENS_DEFAULT: u32 = 8192;

/// Default server bind address
pub const BIND_ADDRESS_DEFAULT: &str = "0.0.0.0:8000";

/// Session-protocol server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpSettings {
    /// MCP endpoint URL
    pub url: String,
    /// Bearer token for the MCP server
    pub api_key: String,
}

impl McpSettings {
    /// Read settings from process environment
    ///
    /// `N8N_MCP_URL` defaults; `N8N_MCP_API_KEY` may be empty, in which
    /// case the session transport refuses to initialize with a
    /// configuration error at first use.
    pub fn from_env() -> Self {
        Self {
            url: env::var("N8N_MCP_URL").unwrap_or_else(|_| MCP_URL_DEFAULT.to_string()),
            api_key: env::var("N8N_MCP_API_KEY").unwrap_or_default(),
        }
    }

    /// Validate that the settings are usable for a live handshake
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::invalid_configuration("N8N_MCP_URL", "must not be empty"));
        }
        if self.api_key.is_empty() {
            return Err(Error::invalid_configuration(
                "N8N_MCP_API_KEY",
                "not set; create an API key for the MCP server and export it",
            ));
        }
        Ok(())
    }
}

/// LLM provider settings (OpenAI-compatible chat endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API base URL
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Max tokens in response
    pub max_tokens: u32,
}

impl LlmSettings {
    /// Create settings from environment, `None` when no key is configured
    ///
    /// Absence is not fatal: the chat surface degrades to an explanatory
    /// assistant message instead.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("FLOWGENT_LLM_API_KEY"))
            .ok()?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self {
            base_url: env::var("FLOWGENT_LLM_BASE_URL")
                .unwrap_or_else(|_| LLM_BASE_URL_DEFAULT.to_string()),
            api_key,
            model: env::var("FLOWGENT_LLM_MODEL").unwrap_or_else(|_| LLM_MODEL_DEFAULT.to_string()),
            max_tokens: LLM_MAX_TOKENS_DEFAULT,
        })
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind the API server (host:port)
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: BIND_ADDRESS_DEFAULT.to_string(),
        }
    }
}

impl ServerSettings {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.bind.contains(':') {
            return Err(Error::invalid_configuration(
                "server.bind",
                "must be in host:port format",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_settings_valid() {
        let settings = ServerSettings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_bind_address() {
        let settings = ServerSettings {
            bind: "no-port".to_string(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_mcp_settings_require_api_key() {
        let settings = McpSettings {
            url: MCP_URL_DEFAULT.to_string(),
            api_key: String::new(),
        };
        let err = settings.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("N8N_MCP_API_KEY"));
    }

    #[test]
    fn test_mcp_settings_valid() {
        let settings = McpSettings {
            url: MCP_URL_DEFAULT.to_string(),
            api_key: "token".to_string(),
        };
        assert!(settings.validate().is_ok());
    }
}
