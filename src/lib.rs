//! API gateway library: discovery lookup, optional authentication and
//! rule-based authorization, and transparent forwarding to backends.

pub mod admin;
pub mod auth;
pub mod config;
pub mod discovery;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod rules;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
