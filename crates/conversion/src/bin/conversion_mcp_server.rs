//cargo run --package conversion --bin conversion_mcp_server -- [config.toml]
use std::sync::Arc;

use conversion::{mcp::ConversionMcpServer, FsConversionService, ServiceConfig};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Config file used when no path is given on the command line
const CONFIG_ENV: &str = "PNG_TO_DXF_CONFIG";

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Set up logging to stderr (MCP uses stdout for protocol communication)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish()
        .init();

    let config = match std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV).ok()) {
        Some(path) => ServiceConfig::from_file(&path)?,
        None => ServiceConfig::default(),
    }
    .with_env_overrides();

    tracing::info!(data_dir = %config.data_dir.display(), "Starting PNG to DXF MCP server");

    let service = Arc::new(FsConversionService::from_config(&config)?);
    let running = ConversionMcpServer::new(service)
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("Failed to start MCP server: {:?}", e))?;

    tokio::select! {
        quit = running.waiting() => {
            let reason = quit?;
            tracing::info!(?reason, "MCP client disconnected");
        }
        _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl+C, shutting down"),
    }
    Ok(())
}
