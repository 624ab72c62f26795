//! Flowgent server binary

use clap::Parser;
use flowgent_client::{default_http_client, McpClient, WorkflowService};
use flowgent_core::{LlmSettings, McpSettings};
use flowgent_server::agent::Agent;
use flowgent_server::api;
use flowgent_server::state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Flowgent server CLI
#[derive(Parser, Debug)]
#[command(name = "flowgent-server")]
#[command(about = "Conversational n8n workflow assistant backend")]
#[command(version)]
struct Cli {
    /// Bind address
    #[arg(short, long, default_value = flowgent_core::config::BIND_ADDRESS_DEFAULT)]
    bind: String,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::info!(bind = %cli.bind, "Flowgent server starting");

    let mcp_settings = McpSettings::from_env();
    if let Err(e) = mcp_settings.validate() {
        tracing::warn!(error = %e, "session transport not fully configured; tool calls will fail until fixed");
    }

    let llm_settings = LlmSettings::from_env();
    if llm_settings.is_none() {
        tracing::warn!("no LLM API key configured; chat degrades to a remediation message");
    }

    let http = default_http_client();
    let mcp = Arc::new(McpClient::new(mcp_settings, http.clone()));
    let service = Arc::new(WorkflowService::new(mcp, http.clone()));
    let agent = Arc::new(Agent::new(llm_settings, service.clone(), http));
    let state = AppState::new(service, agent);

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Flowgent server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
}
