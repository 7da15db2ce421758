//! Discovery record and error definitions.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Where a request should be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscoveryRecord {
    /// Backend host.
    #[serde(alias = "ip")]
    pub address: String,

    /// Backend port; the wire may carry it as a string.
    #[serde(deserialize_with = "port")]
    pub port: u16,

    /// Whether the service is currently registered.
    #[serde(default)]
    pub status: bool,
}

fn port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port {:?}", text))),
    }
}

/// Errors that can occur while resolving a service.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Discovery knows no route for this verb and path.
    #[error("The '{path}' path is not available for '{verb}' method.")]
    NotFound { verb: String, path: String },

    /// Discovery answered, but not with something usable.
    #[error("The Discovery Service response is wrong.")]
    BadResponse(String),

    /// Discovery could not be reached in time.
    #[error("The Discovery Service is not available.")]
    Unavailable(String),

    /// The route exists but its service is not currently registered.
    #[error("The requested endpoint is not available.")]
    Unregistered { verb: String, path: String },
}

impl DiscoveryError {
    /// Internal detail for logs; the Display text is what callers see.
    pub fn detail(&self) -> String {
        match self {
            DiscoveryError::NotFound { verb, path } | DiscoveryError::Unregistered { verb, path } => {
                format!("{} {}", verb, path)
            }
            DiscoveryError::BadResponse(detail) | DiscoveryError::Unavailable(detail) => {
                detail.clone()
            }
        }
    }
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_as_string() {
        let record: DiscoveryRecord =
            serde_json::from_str(r#"{"address": "localhost", "port": "5568", "status": true}"#)
                .unwrap();
        assert_eq!(
            record,
            DiscoveryRecord {
                address: "localhost".into(),
                port: 5568,
                status: true,
            }
        );
    }

    #[test]
    fn test_port_as_number_and_ip_alias() {
        let record: DiscoveryRecord =
            serde_json::from_str(r#"{"ip": "10.0.0.4", "port": 80, "status": true}"#).unwrap();
        assert_eq!(record.address, "10.0.0.4");
        assert_eq!(record.port, 80);
    }

    #[test]
    fn test_missing_status_means_unregistered() {
        let record: DiscoveryRecord =
            serde_json::from_str(r#"{"address": "localhost", "port": 1}"#).unwrap();
        assert!(!record.status);
    }

    #[test]
    fn test_invalid_port() {
        assert!(serde_json::from_str::<DiscoveryRecord>(
            r#"{"address": "localhost", "port": "http", "status": true}"#
        )
        .is_err());
        assert!(serde_json::from_str::<DiscoveryRecord>(
            r#"{"address": "localhost", "port": 70000, "status": true}"#
        )
        .is_err());
    }

    #[test]
    fn test_error_display() {
        let err = DiscoveryError::NotFound {
            verb: "GET".into(),
            path: "/order/5".into(),
        };
        assert_eq!(
            err.to_string(),
            "The '/order/5' path is not available for 'GET' method."
        );
        assert_eq!(err.detail(), "GET /order/5");
    }
}
