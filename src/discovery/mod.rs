//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! verb + request path
//!     → client.rs (GET {discovery}/microservices?verb=..&path=..)
//!     → types.rs (decode record, coerce port)
//!     → DiscoveryRecord { address, port, status }
//! ```
//!
//! # Design Decisions
//! - No caching: each request performs a fresh lookup
//! - No retries: a single failure is terminal for the request
//! - "Unreachable" and "bad answer" are distinct error kinds

pub mod client;
pub mod types;

pub use client::DiscoveryClient;
pub use types::{DiscoveryError, DiscoveryRecord, DiscoveryResult};
