//! Gateway error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::discovery::DiscoveryError;
use crate::proxy::ProxyError;
use crate::rules::StoreError;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Every way a gateway request can fail.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("The given request does not have authorization to be forwarded.")]
    Unauthorized,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("The request body exceeds {limit} bytes.")]
    PayloadTooLarge { limit: usize },

    #[error("{0}")]
    BadRequest(String),

    #[error("Rule storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Auth(AuthError::NoToken)
            | GatewayError::Auth(AuthError::InvalidAuthentication)
            | GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Auth(AuthError::ServiceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Discovery(e) => match e {
                DiscoveryError::NotFound { .. } => StatusCode::NOT_FOUND,
                DiscoveryError::BadResponse(_) => StatusCode::BAD_GATEWAY,
                DiscoveryError::Unavailable(_) => StatusCode::GATEWAY_TIMEOUT,
                DiscoveryError::Unregistered { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            GatewayError::Proxy(ProxyError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Auth(AuthError::NoToken) => "NO_TOKEN",
            GatewayError::Auth(AuthError::InvalidAuthentication) => "INVALID_AUTHENTICATION",
            GatewayError::Auth(AuthError::ServiceUnavailable(_)) => "AUTH_SERVICE_UNAVAILABLE",
            GatewayError::Unauthorized => "UNAUTHORIZED",
            GatewayError::Discovery(DiscoveryError::NotFound { .. }) => "DISCOVERY_NOT_FOUND",
            GatewayError::Discovery(DiscoveryError::BadResponse(_)) => "DISCOVERY_BAD_RESPONSE",
            GatewayError::Discovery(DiscoveryError::Unavailable(_)) => "DISCOVERY_UNAVAILABLE",
            GatewayError::Discovery(DiscoveryError::Unregistered { .. }) => "SERVICE_UNREGISTERED",
            GatewayError::Proxy(_) => "BACKEND_UNAVAILABLE",
            GatewayError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            GatewayError::BadRequest(_) => "BAD_REQUEST",
            GatewayError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Text safe to show the caller.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn detail(&self) -> String {
        match self {
            GatewayError::Auth(AuthError::ServiceUnavailable(detail))
            | GatewayError::Proxy(ProxyError::Unavailable(detail)) => detail.clone(),
            GatewayError::Discovery(e) => e.detail(),
            other => other.to_string(),
        }
    }

    /// Log at a level matching the status.
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                detail = %self.detail(),
                error_code = %code,
                status = %status.as_u16(),
                "Request failed"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error = %self, error_code = %code, "Request rejected");
        } else {
            tracing::debug!(error = %self, error_code = %code, "Client error");
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
