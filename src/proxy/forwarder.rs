//! Outbound forwarding to resolved backends.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the resolved address
//! - Replay method, headers and the buffered body
//! - Hand the backend response back untouched

use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{
        header,
        request::Parts,
        uri::{Authority, Scheme},
        HeaderMap, Request, Response, Uri,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::ProxyConfig;

/// Headers that describe the inbound connection, not the request.
const HOP_BY_HOP: [header::HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwarding failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The target could not be reached or did not answer in time.
    #[error("The requested endpoint is not available.")]
    Unavailable(String),
}

/// Replays requests against a target with a shared connection pool.
#[derive(Clone)]
pub struct ProxyForwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl ProxyForwarder {
    pub fn new(config: &ProxyConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Same connection pool with a different per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward to `address:port`, keeping the original path and query.
    pub async fn forward(
        &self,
        address: &str,
        port: u16,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Response<Body>, ProxyError> {
        let uri = rewrite_uri(&parts.uri, address, port, None)?;
        self.send(uri, parts, body).await
    }

    /// Send the request to an already rewritten URI.
    pub async fn send(
        &self,
        uri: Uri,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Response<Body>, ProxyError> {
        tracing::debug!(method = %parts.method, uri = %uri, "Sending upstream");

        let mut request = Request::new(Body::from(body));
        *request.method_mut() = parts.method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = outbound_headers(&parts.headers);

        let response = match tokio::time::timeout(self.timeout, self.client.request(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ProxyError::Unavailable(e.to_string())),
            Err(_) => {
                return Err(ProxyError::Unavailable(format!(
                    "no response within {:?}",
                    self.timeout
                )))
            }
        };

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

impl std::fmt::Debug for ProxyForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyForwarder")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Point `uri` at `address:port` over plain HTTP, optionally replacing the path.
///
/// The query string is kept either way.
pub fn rewrite_uri(
    uri: &Uri,
    address: &str,
    port: u16,
    path: Option<&str>,
) -> Result<Uri, ProxyError> {
    let host = if address.contains(':') && !address.starts_with('[') {
        format!("[{}]", address)
    } else {
        address.to_string()
    };
    let authority = Authority::from_str(&format!("{}:{}", host, port))
        .map_err(|e| ProxyError::Unavailable(format!("invalid target {}: {}", address, e)))?;

    let path = path.unwrap_or_else(|| uri.path());
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(authority)
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| ProxyError::Unavailable(e.to_string()))
}

/// Copy the caller's headers minus hop-by-hop, Host and framing headers.
///
/// The client recomputes Host and Content-Length for the new target.
fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_rewrite_keeps_path_and_query() {
        let uri: Uri = "/order/5?expand=items".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "10.0.0.4", 5568, None).unwrap();
        assert_eq!(rewritten.to_string(), "http://10.0.0.4:5568/order/5?expand=items");
    }

    #[test]
    fn test_rewrite_replaces_absolute_authority() {
        let uri: Uri = "https://api.example.com/order/5".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "localhost", 80, None).unwrap();
        assert_eq!(rewritten.to_string(), "http://localhost:80/order/5");
    }

    #[test]
    fn test_rewrite_with_path() {
        let uri: Uri = "/auth/users/login?next=%2F".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "auth", 8082, Some("/auth/users/login")).unwrap();
        assert_eq!(rewritten.to_string(), "http://auth:8082/auth/users/login?next=%2F");
    }

    #[test]
    fn test_rewrite_ipv6_and_invalid() {
        let uri: Uri = "/".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "::1", 8080, None).unwrap();
        assert_eq!(rewritten.authority().unwrap().as_str(), "[::1]:8080");

        assert!(rewrite_uri(&uri, "bad host", 80, None).is_err());
    }

    #[test]
    fn test_outbound_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("gateway:5566"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("4"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        inbound.insert("x-request-id", HeaderValue::from_static("abc"));

        let outbound = outbound_headers(&inbound);
        assert!(outbound.get(header::HOST).is_none());
        assert!(outbound.get(header::CONNECTION).is_none());
        assert!(outbound.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(outbound.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(outbound.get("x-request-id").unwrap(), "abc");
    }
}
