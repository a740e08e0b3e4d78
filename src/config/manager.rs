//! Configuration Manager

use super::Config;
use crate::Result;
use anyhow::{bail, Context};
use std::net::SocketAddr;
use std::path::Path;

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            config
                .validate()
                .with_context(|| "Configuration validation failed")?;

            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!(
                "Configuration file not found at {}, using defaults",
                path.display()
            );
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        let mut config = Config::default();

        if let Ok(bind_addr) = std::env::var("RUSTECHO_BIND_ADDR") {
            config.server.bind_addr = bind_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid RUSTECHO_BIND_ADDR: {}", bind_addr))?;
        }

        if let Ok(buffer_size) = std::env::var("RUSTECHO_BUFFER_SIZE") {
            config.server.buffer_size = buffer_size
                .parse::<usize>()
                .with_context(|| format!("Invalid RUSTECHO_BUFFER_SIZE: {}", buffer_size))?;
        }

        if let Ok(server_addr) = std::env::var("RUSTECHO_SERVER_ADDR") {
            config.client.server_addr = server_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid RUSTECHO_SERVER_ADDR: {}", server_addr))?;
        }

        if let Ok(timeout) = std::env::var("RUSTECHO_CONNECT_TIMEOUT") {
            config.client.connect_timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid RUSTECHO_CONNECT_TIMEOUT: {}", timeout))?;
        }

        if let Ok(timeout) = std::env::var("RUSTECHO_REPLY_TIMEOUT") {
            config.client.reply_timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid RUSTECHO_REPLY_TIMEOUT: {}", timeout))?;
        }

        if let Ok(log_level) = std::env::var("RUSTECHO_LOG_LEVEL") {
            config.monitoring.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_server_config()
            .with_context(|| "Server configuration validation failed")?;

        self.validate_client_config()
            .with_context(|| "Client configuration validation failed")?;

        self.validate_monitoring_config()
            .with_context(|| "Monitoring configuration validation failed")?;

        Ok(())
    }

    /// Validate server configuration
    fn validate_server_config(&self) -> Result<()> {
        if self.server.buffer_size == 0 {
            bail!("buffer_size must be greater than 0");
        }

        if self.server.buffer_size > 1048576 {
            bail!("buffer_size cannot exceed 1MB");
        }

        Ok(())
    }

    /// Validate client driver configuration
    fn validate_client_config(&self) -> Result<()> {
        if self.client.server_addr.port() == 0 {
            bail!("client.server_addr must carry a concrete port");
        }

        if self.client.connect_timeout.as_millis() == 0 {
            bail!("client.connect_timeout must be greater than 0");
        }

        if self.client.reply_timeout.as_millis() == 0 {
            bail!("client.reply_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Validate monitoring configuration
    fn validate_monitoring_config(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.monitoring.log_level.as_str()) {
            bail!(
                "monitoring.log_level must be one of: {}",
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_cli_args(
        &mut self,
        bind: Option<&str>,
        port: Option<u16>,
        buffer_size: Option<usize>,
    ) {
        // Override bind address if provided
        if let Some(bind_str) = bind {
            if let Ok(addr) = bind_str.parse::<SocketAddr>() {
                self.server.bind_addr = addr;
                tracing::info!("CLI override: bind address set to {}", addr);
            } else {
                tracing::warn!("Invalid bind address provided: {}", bind_str);
            }
        }

        // Override port if provided
        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
            tracing::info!("CLI override: port set to {}", port);
        }

        // Override buffer size if provided
        if let Some(buffer_size) = buffer_size {
            self.server.buffer_size = buffer_size;
            tracing::info!("CLI override: buffer size set to {} bytes", buffer_size);
        }
    }
}
