//! Proxy forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! (parts, buffered body) + DiscoveryRecord
//!     → forwarder.rs (scheme=http, authority=address:port)
//!     → hyper-util pooled client
//!     → backend response (status, headers, body streamed back)
//! ```
//!
//! # Design Decisions
//! - One attempt per request, no retries
//! - Independent timeout from discovery and auth
//! - Response bodies are streamed, never re-encoded

pub mod forwarder;

pub use forwarder::{rewrite_uri, ProxyError, ProxyForwarder};
