//! Request target derivation.
//!
//! # Responsibilities
//! - Derive the logical service name from the inbound path
//! - Normalise the path handed to the discovery service
//! - Rebuild the full URL that rules are matched against
//!
//! # Design Decisions
//! - Service name is the first non-empty path segment
//! - Inbound requests are plain HTTP, so the rebuilt URL uses `http`

use axum::http::{header, HeaderMap, Uri};

/// Routing-relevant view of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// Logical backend service (empty for `/`).
    pub service: String,
    /// Path without scheme, authority, query or fragment.
    pub path: String,
    /// Absolute URL used for rule matching.
    pub url: String,
}

impl RouteTarget {
    /// Build the target from a request URI and its headers.
    pub fn from_request(uri: &Uri, headers: &HeaderMap) -> Self {
        let path = normalize_path(uri.path());
        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "localhost".to_string());
        let url = match uri.query() {
            Some(query) => format!("http://{}{}?{}", authority, path, query),
            None => format!("http://{}{}", authority, path),
        };

        Self {
            service: service_name(&path).to_string(),
            path,
            url,
        }
    }
}

/// First non-empty segment of a path.
pub fn service_name(path: &str) -> &str {
    path.split('/').find(|s| !s.is_empty()).unwrap_or_default()
}

/// Strip scheme, authority, query and fragment, keeping a leading `/`.
pub fn normalize_path(path_or_url: &str) -> String {
    let without_scheme = match path_or_url.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|idx| &rest[idx..]).unwrap_or("/"),
        None => path_or_url,
    };
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
