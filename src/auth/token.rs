//! Bearer token extraction.

use axum::http::{header, HeaderMap};

use crate::auth::AuthError;

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The header must split on whitespace into exactly two parts, the first being `Bearer`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::NoToken)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::NoToken),
    }
}
