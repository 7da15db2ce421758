//! Discovery service client with timeout and error handling.
//!
//! # Responsibilities
//! - Resolve a verb + path to a backend address
//! - Classify failures: no route, bad answer, unreachable, unregistered
//! - List registered endpoints for the admin API

use std::time::Duration;

use axum::http::StatusCode;
use url::Url;

use crate::config::DiscoveryConfig;
use crate::discovery::types::{DiscoveryError, DiscoveryRecord, DiscoveryResult};
use crate::gateway::ContextError;
use crate::routing::normalize_path;

/// Client for the external discovery service.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    client: reqwest::Client,
    lookup_url: Url,
    endpoints_url: Url,
}

impl DiscoveryClient {
    /// Create a client for the configured discovery service.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, ContextError> {
        let base = Url::parse(&format!("http://{}:{}", config.host, config.port))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            lookup_url: base.join(&config.path)?,
            endpoints_url: base.join(&config.endpoints_path)?,
        })
    }

    /// Resolve the backend serving `verb` on `path_or_url`.
    ///
    /// Every call performs a fresh lookup; topology may change between requests.
    pub async fn resolve(&self, path_or_url: &str, verb: &str) -> DiscoveryResult<DiscoveryRecord> {
        let path = normalize_path(path_or_url);
        let mut url = self.lookup_url.clone();
        url.query_pairs_mut()
            .append_pair("verb", verb)
            .append_pair("path", &path);

        tracing::debug!(verb = %verb, path = %path, "Querying discovery");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DiscoveryError::NotFound {
                verb: verb.to_string(),
                path,
            });
        }
        if !status.is_success() {
            return Err(DiscoveryError::BadResponse(format!(
                "discovery answered {}",
                status
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(read_error)?;
        if !body.get("status").and_then(|s| s.as_bool()).unwrap_or(false) {
            return Err(DiscoveryError::Unregistered {
                verb: verb.to_string(),
                path,
            });
        }

        serde_json::from_value(body).map_err(|e| DiscoveryError::BadResponse(e.to_string()))
    }

    /// Every endpoint registered in discovery, as returned by the service.
    pub async fn endpoints(&self) -> DiscoveryResult<serde_json::Value> {
        let response = self
            .client
            .get(self.endpoints_url.clone())
            .send()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::BadResponse(format!(
                "discovery answered {}",
                status
            )));
        }
        response.json().await.map_err(read_error)
    }
}

fn read_error(e: reqwest::Error) -> DiscoveryError {
    if e.is_timeout() {
        DiscoveryError::Unavailable(e.to_string())
    } else {
        DiscoveryError::BadResponse(e.to_string())
    }
}
