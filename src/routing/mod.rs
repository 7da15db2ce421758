//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (uri, host header)
//!     → router.rs (service name, discovery path, full URL)
//!     → matcher.rs (evaluate stored wildcard patterns against the URL)
//!     → Return: match / no match
//! ```
//!
//! # Design Decisions
//! - Reserved gateway routes are resolved by the HTTP layer before this runs
//! - Deterministic: same input always yields the same target
//! - No regex in hot path

pub mod matcher;
pub mod router;

pub use matcher::{matches, UrlPattern};
pub use router::{normalize_path, service_name, RouteTarget};
