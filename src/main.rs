//! RustEcho - Concurrent TCP Echo Server
//!
//! Accepts TCP connections on a configured address and echoes every received
//! byte back to the peer, with one concurrently scheduled handler task per
//! connection.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rustecho::{config::ConfigManager, ConnectionManager, ShutdownCoordinator};

/// CLI arguments for RustEcho
#[derive(Parser, Debug)]
#[command(name = "rustecho")]
#[command(about = "RustEcho - Concurrent TCP Echo Server")]
#[command(version)]
#[command(long_about = "
RustEcho - Concurrent TCP Echo Server

Echoes every byte a client sends straight back on the same connection, with
one concurrently scheduled handler per accepted connection.

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  RUSTECHO_BIND_ADDR       - Bind address (e.g., 127.0.0.1:3000)
  RUSTECHO_BUFFER_SIZE     - Echo buffer size in bytes
  RUSTECHO_SERVER_ADDR     - Address the client driver connects to
  RUSTECHO_CONNECT_TIMEOUT - Client driver connect timeout (e.g., 5s)
  RUSTECHO_REPLY_TIMEOUT   - Client driver reply timeout (e.g., 5s)
  RUSTECHO_LOG_LEVEL       - Log level (trace, debug, info, warn, error)
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Bind address (overrides config file)
    #[arg(short, long, help = "Bind address (e.g., 127.0.0.1:3000)")]
    pub bind: Option<String>,

    /// Port to bind to (overrides config file)
    #[arg(short, long, help = "Port to bind to")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", help = "Log level")]
    pub log_level: String,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Echo buffer size in bytes
    #[arg(long, help = "Echo buffer size in bytes")]
    pub buffer_size: Option<usize>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit")]
    pub validate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    init_tracing(&args)?;

    info!("Starting RustEcho v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        info!("Config file not found, checking environment variables");
        ConfigManager::load_from_env()?
    };

    config.merge_with_cli_args(args.bind.as_deref(), args.port, args.buffer_size);

    // Final validation after all overrides
    config
        .validate()
        .context("Final configuration validation failed")?;

    if args.validate_config {
        info!("Configuration is valid");
        info!("Configuration summary:");
        info!("  Bind address: {}", config.server.bind_addr);
        info!("  Buffer size: {} bytes", config.server.buffer_size);
        info!("  Client target: {}", config.client.server_addr);
        return Ok(());
    }

    let shutdown_coordinator = ShutdownCoordinator::new();

    // Bind before spawning the accept loop: a bind failure is fatal and must
    // abort startup before any accepting begins.
    let mut connection_manager = ConnectionManager::new(Arc::new(config));
    connection_manager
        .bind()
        .await
        .context("Failed to start listener")?;

    let shutdown_handle = connection_manager.shutdown_handle();

    // Start the accept loop in a separate task
    let server_handle = tokio::spawn(async move {
        let mut manager = connection_manager;
        if let Err(e) = manager.start().await {
            error!("Server error: {}", e);
        }
    });

    info!("Press Ctrl+C or send SIGTERM/SIGINT to stop the server");

    shutdown_coordinator.listen_for_signals().await?;

    // Stop accepting new connections and close the listener. In-flight
    // handlers are not joined; live connections close abruptly at exit.
    let _ = shutdown_handle.send(());

    if let Err(e) = server_handle.await {
        if !e.is_cancelled() {
            error!("Server task failed: {}", e);
        }
    }

    info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}
