//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (strip spoofed identity)
//!     → [authentication via auth::AuthDelegate]
//!     → access_control.rs (evaluate authentication/authorization rules)
//!     → headers.rs (inject validated identity)
//!     → Pass to discovery
//! ```
//!
//! # Design Decisions
//! - Fail closed: no matching rule means denial
//! - No trust in client input

pub mod access_control;
pub mod headers;

pub use access_control::{authorize, authorize_role};
