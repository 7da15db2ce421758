//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → /auth*      → auth::AuthDelegate::passthrough
//!     → /admin/*    → admin router
//!     → everything else → gateway::handle
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
