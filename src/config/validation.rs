//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check header names and paths are usable on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must start with '/': {value}")]
    RelativePath { field: &'static str, value: String },

    #[error("auth.identity_header is not a valid header name: {0}")]
    InvalidHeader(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.is_empty() {
        errors.push(ValidationError::Empty { field: "listener.host" });
    }
    if config.discovery.host.is_empty() {
        errors.push(ValidationError::Empty { field: "discovery.host" });
    }
    if config.discovery.port == 0 {
        errors.push(ValidationError::Zero { field: "discovery.port" });
    }
    if config.auth.enabled {
        if config.auth.host.is_empty() {
            errors.push(ValidationError::Empty { field: "auth.host" });
        }
        if config.auth.port == 0 {
            errors.push(ValidationError::Zero { field: "auth.port" });
        }
    }

    for (field, value) in [
        ("discovery.path", &config.discovery.path),
        ("discovery.endpoints_path", &config.discovery.endpoints_path),
        ("auth.path", &config.auth.path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        }
    }

    if HeaderName::from_bytes(config.auth.identity_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(
            config.auth.identity_header.clone(),
        ));
    }

    for (field, value) in [
        ("discovery.timeout_secs", config.discovery.timeout_secs),
        ("auth.timeout_secs", config.auth.timeout_secs),
        ("proxy.timeout_secs", config.proxy.timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("admin.session_ttl_secs", config.admin.session_ttl_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    if config.proxy.max_body_size == 0 {
        errors.push(ValidationError::Zero {
            field: "proxy.max_body_size",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
