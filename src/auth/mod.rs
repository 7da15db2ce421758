//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Protected route:
//!     → token.rs (Authorization: Bearer <token>)
//!     → delegate.rs (POST {auth}/validate-token with caller headers + body)
//!     → Identity { user, role }
//!
//! /auth, /auth/{service}, /auth/{service}/login:
//!     → delegate.rs (passthrough, response returned untouched)
//! ```
//!
//! # Design Decisions
//! - The gateway never inspects credentials itself
//! - Identity lives for one request and is never stored
//! - Auth service outages are reported apart from discovery outages

pub mod delegate;
pub mod token;

use serde::Deserialize;
use thiserror::Error;

use crate::rules::model::optional_token;

pub use delegate::AuthDelegate;
pub use token::extract_bearer_token;

/// The caller as reported by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    /// Opaque subject identifier.
    #[serde(alias = "uuid", alias = "sub")]
    pub user: String,

    /// Role used for authorization, if the auth service reports one.
    #[serde(default, deserialize_with = "optional_token")]
    pub role: Option<String>,
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("The request does not carry a bearer token.")]
    NoToken,

    #[error("The given credentials are not valid.")]
    InvalidAuthentication,

    #[error("The Authentication Service is not available.")]
    ServiceUnavailable(String),
}
