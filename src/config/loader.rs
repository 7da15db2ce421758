//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finish(config)
}

/// Like [`load_config`], but a missing file means built-in defaults.
///
/// Environment overrides and validation still apply.
pub fn load_config_or_default(path: &Path) -> Result<GatewayConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        finish(GatewayConfig::default())
    }
}

/// Apply environment overrides to an in-memory config and validate it.
pub fn finish(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Override file values with environment variables.
///
/// `lookup` abstracts `std::env::var` so overrides can be tested without
/// touching the process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("API_GATEWAY_REST_HOST") {
        config.listener.host = host;
    }
    if let Some(port) = lookup("API_GATEWAY_REST_PORT") {
        config.listener.port = parse_port("API_GATEWAY_REST_PORT", port)?;
    }
    if let Some(enabled) = lookup("API_GATEWAY_REST_AUTH_ENABLED") {
        config.auth.enabled = parse_bool("API_GATEWAY_REST_AUTH_ENABLED", enabled)?;
    }
    if let Some(enabled) = lookup("API_GATEWAY_REST_AUTHORIZATION_ENABLED") {
        config.authorization.enabled =
            parse_bool("API_GATEWAY_REST_AUTHORIZATION_ENABLED", enabled)?;
    }
    if let Some(host) = lookup("API_GATEWAY_AUTH_HOST") {
        config.auth.host = host;
    }
    if let Some(port) = lookup("API_GATEWAY_AUTH_PORT") {
        config.auth.port = parse_port("API_GATEWAY_AUTH_PORT", port)?;
    }
    if let Some(host) = lookup("DISCOVERY_SERVICE_HOST") {
        config.discovery.host = host;
    }
    if let Some(port) = lookup("DISCOVERY_SERVICE_PORT") {
        config.discovery.port = parse_port("DISCOVERY_SERVICE_PORT", port)?;
    }
    Ok(())
}

fn parse_port(var: &'static str, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env { var, value }),
    }
}
