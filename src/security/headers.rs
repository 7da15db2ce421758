//! Identity header handling.
//!
//! # Responsibilities
//! - Strip caller-supplied identity headers from every inbound request
//! - Inject the freshly validated identity before forwarding
//!
//! # Design Decisions
//! - Never trust an identity header from the client, whatever the auth setting
//! - Every occurrence is removed, not just the first

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Remove every value of the identity header. Returns true if any was present.
pub fn strip_identity(headers: &mut HeaderMap, name: &HeaderName) -> bool {
    let spoofed = headers.contains_key(name);
    if spoofed {
        headers.remove(name);
        tracing::warn!(header = %name, "Stripped caller-supplied identity header");
    }
    spoofed
}

/// Set the identity header to `user`. Users that are not valid header values are skipped.
pub fn inject_identity(headers: &mut HeaderMap, name: &HeaderName, user: &str) {
    match HeaderValue::from_str(user) {
        Ok(value) => {
            headers.insert(name.clone(), value);
        }
        Err(_) => {
            tracing::warn!(header = %name, "Identity is not a valid header value, not forwarded");
        }
    }
}
