//! Delegation of credential checks to the external authentication service.
//!
//! # Responsibilities
//! - Validate bearer tokens via `POST {auth.path}/validate-token`
//! - Proxy login and other auth routes through unchanged
//! - Keep auth outages distinguishable from rejected credentials

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, request::Parts, HeaderMap, Response},
};
use url::Url;

use crate::auth::{AuthError, Identity};
use crate::config::AuthConfig;
use crate::gateway::ContextError;
use crate::proxy::{rewrite_uri, ProxyForwarder};

/// Client for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthDelegate {
    client: reqwest::Client,
    forwarder: ProxyForwarder,
    validate_url: Url,
    host: String,
    port: u16,
    path: String,
}

impl AuthDelegate {
    /// Create a delegate. Passthrough shares `forwarder`'s connection pool but
    /// answers to the auth service timeout.
    pub fn new(config: &AuthConfig, forwarder: ProxyForwarder) -> Result<Self, ContextError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let base = Url::parse(&format!("http://{}:{}", config.host, config.port))?;
        let validate_url = base.join(&format!(
            "{}/validate-token",
            config.path.trim_end_matches('/')
        ))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            forwarder: forwarder.with_timeout(timeout),
            validate_url,
            host: config.host.clone(),
            port: config.port,
            path: config.path.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the auth service who the caller is.
    ///
    /// The caller's headers and body are forwarded as received.
    pub async fn validate_token(&self, headers: &HeaderMap, body: Bytes) -> Result<Identity, AuthError> {
        let mut outbound = headers.clone();
        outbound.remove(header::HOST);
        outbound.remove(header::CONTENT_LENGTH);
        outbound.remove(header::TRANSFER_ENCODING);
        outbound.remove(header::CONNECTION);

        tracing::debug!(url = %self.validate_url, "Validating token");

        let response = self
            .client
            .post(self.validate_url.clone())
            .headers(outbound)
            .body(body)
            .send()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = %status, "Token rejected");
            return Err(AuthError::InvalidAuthentication);
        }

        response.json::<Identity>().await.map_err(|e| {
            if e.is_timeout() {
                AuthError::ServiceUnavailable(e.to_string())
            } else {
                tracing::warn!(error = %e, "Undecodable validate-token response");
                AuthError::InvalidAuthentication
            }
        })
    }

    /// Proxy `sub_path` (the part after the reserved `/auth` prefix) to the auth service.
    pub async fn passthrough(
        &self,
        sub_path: &str,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Response<Body>, AuthError> {
        let path = format!("{}{}", self.path, sub_path);
        let path = if path.is_empty() { "/".to_string() } else { path };
        let uri = rewrite_uri(&parts.uri, &self.host, self.port, Some(&path))
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        tracing::info!(method = %parts.method, uri = %uri, "Passing through to authentication service");

        self.forwarder
            .send(uri, parts, body)
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))
    }
}
