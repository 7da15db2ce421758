//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Discovery service connection.
    pub discovery: DiscoveryConfig,

    /// Authentication service connection and identity propagation.
    pub auth: AuthConfig,

    /// Rule-based authorization.
    pub authorization: AuthorizationConfig,

    /// Administrative endpoints.
    pub admin: AdminConfig,

    /// Backend forwarding.
    pub proxy: ProxyConfig,

    /// Rule persistence.
    pub storage: StorageConfig,

    /// Inbound timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` pair handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5566,
        }
    }
}

/// Discovery service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub host: String,
    pub port: u16,

    /// Lookup path, queried with `verb` and `path` parameters.
    pub path: String,

    /// Path listing every registered endpoint (admin only).
    pub endpoints_path: String,

    /// Timeout for a single discovery call in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5567,
            path: "/microservices".to_string(),
            endpoints_path: "/endpoints".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Authentication service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable authentication of routes covered by authentication rules.
    pub enabled: bool,

    pub host: String,
    pub port: u16,

    /// Path prefix of the authentication service (e.g. "/auth").
    pub path: String,

    /// Header carrying the validated identity to backends.
    pub identity_header: String,

    /// Timeout for a single authentication call in seconds.
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 8082,
            path: "/auth".to_string(),
            identity_header: "X-User".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Authorization configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// When enabled, every proxied request must match an authorization rule.
    pub enabled: bool,
}

/// Admin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,

    /// Lifetime of an admin session token in seconds.
    pub session_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            password: "CHANGE_ME_IN_PRODUCTION".to_string(),
            session_ttl_secs: 3600,
        }
    }
}

/// Backend forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Timeout for a backend call in seconds.
    pub timeout_secs: u64,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Rule persistence configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file the rule store is loaded from and saved to. In-memory only when unset.
    pub rules_path: Option<String>,
}

/// Inbound timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for a whole inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
