//! Configuration loading and validation tests

use rustecho::config::{Config, ConfigManager};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    config.validate().unwrap();

    assert_eq!(config.server.bind_addr, "127.0.0.1:3000".parse().unwrap());
    assert_eq!(config.server.buffer_size, 1024);
    assert_eq!(config.client.server_addr, "127.0.0.1:3000".parse().unwrap());
}

#[test]
fn test_zero_buffer_size_is_rejected() {
    let mut config = Config::default();
    config.server.buffer_size = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_oversized_buffer_is_rejected() {
    let mut config = Config::default();
    config.server.buffer_size = 2 * 1024 * 1024;

    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_log_level_is_rejected() {
    let mut config = Config::default();
    config.monitoring.log_level = "chatty".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_zero_client_timeouts_are_rejected() {
    let mut config = Config::default();
    config.client.connect_timeout = std::time::Duration::from_secs(0);

    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.server.bind_addr = "127.0.0.1:4000".parse().unwrap();
    config.server.buffer_size = 2048;
    fs::write(&config_path, toml::to_string(&config).unwrap()).unwrap();

    let loaded = ConfigManager::load_from_file(&config_path).unwrap();
    assert_eq!(loaded.server.bind_addr, config.server.bind_addr);
    assert_eq!(loaded.server.buffer_size, 2048);
}

#[test]
fn test_load_from_missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let loaded = ConfigManager::load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded.server.buffer_size, 1024);
}

#[test]
fn test_malformed_config_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "not valid toml [[[").unwrap();

    assert!(ConfigManager::load_from_file(&config_path).is_err());
}

#[test]
fn test_config_file_with_invalid_values_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.server.buffer_size = 0;
    fs::write(&config_path, toml::to_string(&config).unwrap()).unwrap();

    assert!(ConfigManager::load_from_file(&config_path).is_err());
}

#[test]
fn test_cli_overrides_take_precedence() {
    let mut config = Config::default();

    config.merge_with_cli_args(Some("0.0.0.0:5000"), None, Some(4096));
    assert_eq!(config.server.bind_addr, "0.0.0.0:5000".parse().unwrap());
    assert_eq!(config.server.buffer_size, 4096);

    config.merge_with_cli_args(None, Some(6000), None);
    assert_eq!(config.server.bind_addr.port(), 6000);
}

#[test]
fn test_invalid_cli_bind_address_is_ignored() {
    let mut config = Config::default();
    let before = config.server.bind_addr;

    config.merge_with_cli_args(Some("not-an-address"), None, None);
    assert_eq!(config.server.bind_addr, before);
}
