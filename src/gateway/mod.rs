//! Gateway orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! Request (not reserved)
//!     → strip identity header, buffer body
//!     → [auth enabled]  rules::Authentication for service ∪ "*"
//!                       → covered: auth::AuthDelegate::validate_token
//!                       → uncovered: anonymous
//!     → [autz enabled]  rules::Authorization for service ∪ "*"
//!                       → security::authorize_role, no match = 401
//!     → discovery::DiscoveryClient::resolve
//!     → proxy::ProxyForwarder::forward
//!     → backend response, or error.rs mapped to a status code
//! ```
//!
//! # Design Decisions
//! - One task per request, no shared mutable request state
//! - The first failure ends the request, nothing is retried
//! - Each external dependency maps to its own error kind

pub mod context;
pub mod error;
pub mod orchestrator;

pub use context::{ContextError, GatewayContext};
pub use error::{GatewayError, GatewayResult};
pub use orchestrator::{handle, read_body};
