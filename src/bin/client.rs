//! RustEcho Client Driver
//!
//! Opens several connections to the echo server concurrently, sends one
//! message on each, performs exactly one read of the reply, and exits. The
//! connections are fully independent: no retry, no shared state.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rustecho::config::ConfigManager;

/// Default messages, one connection each
const DEFAULT_MESSAGES: [&str; 5] = [
    "Hello from Client 1",
    "This is Client 2",
    "Client 3 checking in",
    "Greetings from Client 4",
    "Hi, this is Client 5",
];

/// CLI arguments for the client driver
#[derive(Parser, Debug)]
#[command(name = "rustecho-client")]
#[command(about = "RustEcho Client Driver - concurrent one-shot echo clients")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Server address to connect to (overrides config file)
    #[arg(short, long, help = "Server address (e.g., 127.0.0.1:3000)")]
    pub server: Option<String>,

    /// Message to send; repeat the flag for one connection per message
    #[arg(short, long, help = "Message to send (repeatable)")]
    pub message: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", help = "Log level")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    init_tracing(&args)?;

    let config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        ConfigManager::load_from_env()?
    };

    let server_addr = match args.server.as_deref() {
        Some(addr) => addr
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid server address: {}", addr))?,
        None => config.client.server_addr,
    };

    let messages: Vec<String> = if args.message.is_empty() {
        DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect()
    } else {
        args.message
    };

    info!(
        "Starting {} echo clients against {}",
        messages.len(),
        server_addr
    );

    let mut handles = Vec::new();
    for (i, message) in messages.into_iter().enumerate() {
        let client_id = i + 1;
        let connect_timeout = config.client.connect_timeout;
        let reply_timeout = config.client.reply_timeout;

        handles.push(tokio::spawn(async move {
            run_client(client_id, server_addr, message, connect_timeout, reply_timeout).await
        }));
    }

    let mut failures = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("{:#}", e);
                failures += 1;
            }
            Err(e) => {
                error!("Client task panicked: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} client(s) failed", failures);
    }

    info!("All clients completed");
    Ok(())
}

/// Connect, send one message, read one reply, close.
async fn run_client(
    client_id: usize,
    server_addr: SocketAddr,
    message: String,
    connect_timeout: Duration,
    reply_timeout: Duration,
) -> Result<()> {
    let mut stream = timeout(connect_timeout, TcpStream::connect(server_addr))
        .await
        .with_context(|| format!("Client {} timed out connecting to {}", client_id, server_addr))?
        .with_context(|| format!("Client {} failed to connect to {}", client_id, server_addr))?;

    info!("Client {} connected to {}", client_id, server_addr);

    stream
        .write_all(message.as_bytes())
        .await
        .with_context(|| format!("Client {} failed to send message", client_id))?;

    // Exactly one read of the reply.
    let mut buf = vec![0u8; 1024];
    let n = timeout(reply_timeout, stream.read(&mut buf))
        .await
        .with_context(|| format!("Client {} timed out waiting for the echo", client_id))?
        .with_context(|| format!("Client {} failed to read the echo", client_id))?;

    info!(
        "Client {} received: {}",
        client_id,
        String::from_utf8_lossy(&buf[..n])
    );

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_ansi(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}
