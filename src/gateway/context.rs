//! Shared per-process state handed to every handler.

use std::sync::Arc;

use axum::http::{header::InvalidHeaderName, HeaderName};
use thiserror::Error;

use crate::admin::AdminSessions;
use crate::auth::AuthDelegate;
use crate::config::GatewayConfig;
use crate::discovery::DiscoveryClient;
use crate::proxy::ProxyForwarder;
use crate::rules::{RuleRepository, RuleStore};

/// Failures while wiring the gateway from its configuration.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("invalid service address: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid identity header: {0}")]
    Header(#[from] InvalidHeaderName),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Everything a request needs, built once at startup.
///
/// Nothing here holds per-request state; rules and discovery are read fresh each time.
#[derive(Debug)]
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub rules: RuleRepository,
    pub discovery: DiscoveryClient,
    pub auth: AuthDelegate,
    pub forwarder: ProxyForwarder,
    pub identity_header: HeaderName,
    pub sessions: AdminSessions,
}

impl GatewayContext {
    pub fn new(config: GatewayConfig, store: Arc<dyn RuleStore>) -> Result<Self, ContextError> {
        let forwarder = ProxyForwarder::new(&config.proxy);
        let discovery = DiscoveryClient::new(&config.discovery)?;
        let auth = AuthDelegate::new(&config.auth, forwarder.clone())?;
        let identity_header = HeaderName::try_from(config.auth.identity_header.as_str())?;
        let sessions = AdminSessions::new(config.admin.session_ttl_secs);

        Ok(Self {
            rules: RuleRepository::new(store),
            discovery,
            auth,
            forwarder,
            identity_header,
            sessions,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MemoryRuleStore;

    #[test]
    fn test_identity_header_is_normalised() {
        let context =
            GatewayContext::new(GatewayConfig::default(), Arc::new(MemoryRuleStore::default()))
                .unwrap();
        assert_eq!(context.identity_header.as_str(), "x-user");
    }

    #[test]
    fn test_rejects_invalid_identity_header() {
        let mut config = GatewayConfig::default();
        config.auth.identity_header = "X User".into();
        let err = GatewayContext::new(config, Arc::new(MemoryRuleStore::default())).unwrap_err();
        assert!(matches!(err, ContextError::Header(_)));
    }

    #[test]
    fn test_client_build_failure_is_reported() {
        let err = reqwest::Client::builder()
            .user_agent("bad\nagent")
            .build()
            .unwrap_err();
        let err = ContextError::from(err);
        assert!(matches!(err, ContextError::Client(_)));
        assert!(err.to_string().starts_with("failed to build HTTP client"));
    }
}
