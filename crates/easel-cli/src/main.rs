//! Easel: MCP server for Adobe Illustrator.
//!
//! Speaks MCP over stdio to the assistant and WebSocket to the CEP
//! panel inside Illustrator.
//!
//! # Configuration
//!
//! Loaded in priority order (highest wins):
//!
//! 1. CLI arguments
//! 2. Environment variables (`EASEL_WS_PORT`, `EASEL_HTTP_PORT`,
//!    `EASEL_TIMEOUT`)
//! 3. Project config (`.easel/config.toml` in the working directory)
//! 4. Global config (`~/.easel/config.toml`)
//! 5. Defaults (port 8081, 30 s timeout)

use anyhow::{Context, Result};
use clap::Parser;
use easel_bridge::{ConfigLoader, PanelBridge};
use easel_mcp::EaselServer;
use easel_scripts::LibraryResolver;
use rmcp::{transport::stdio, ServiceExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Easel MCP server for Adobe Illustrator.
#[derive(Parser, Debug)]
#[command(name = "easel")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// WebSocket port for the panel (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Per-call timeout in seconds (overrides config)
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Project root for `.easel/config.toml` (defaults to cwd)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Custom global config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load script libraries from a directory instead of the embedded set
    #[arg(long)]
    scripts_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging: --debug > --verbose > RUST_LOG env > default "warn".
    // Everything goes to stderr; stdout carries the MCP stream.
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_global_config(path);
    }
    let project_root = args
        .project
        .clone()
        .or_else(|| std::env::current_dir().ok());
    if let Some(root) = project_root {
        loader = loader.with_project_root(root);
    }
    let mut config = loader.load().context("loading configuration")?;
    if let Some(port) = args.port {
        config.ws_port = port;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let resolver = match &args.scripts_dir {
        Some(dir) => LibraryResolver::from_dir(dir)
            .with_context(|| format!("loading script libraries from {}", dir.display()))?,
        None => LibraryResolver::embedded(),
    };

    let bridge = Arc::new(
        PanelBridge::start(config.clone())
            .await
            .context("starting WebSocket bridge")?,
    );
    info!(
        port = bridge.port(),
        timeout_secs = config.timeout_secs,
        "bridge ready; panel should connect to ws://127.0.0.1:{}",
        bridge.port()
    );

    let server = EaselServer::new(Arc::clone(&bridge), Arc::new(resolver));
    let service = server
        .serve(stdio())
        .await
        .context("starting MCP server on stdio")?;
    info!("MCP server ready");

    let cancellation_token = service.cancellation_token();
    tokio::select! {
        quit = service.waiting() => {
            quit.context("MCP server terminated")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            cancellation_token.cancel();
        }
    }

    bridge.shutdown().await;
    info!("server shutdown complete");
    Ok(())
}
