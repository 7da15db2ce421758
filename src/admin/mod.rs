//! Administration API.
//!
//! # Data Flow
//! ```text
//! POST /admin/login → handlers::login → session.rs (issue token)
//!
//! /admin/endpoints, /admin/rules*, /admin/autz-rules*
//!     → auth.rs (Bearer <admin token>)
//!     → handlers.rs → RuleRepository / DiscoveryClient
//! ```
//!
//! # Design Decisions
//! - Sessions are process-local and expire after a TTL
//! - Authentication and authorization rules share one set of handlers

pub mod auth;
pub mod handlers;
pub mod session;

use axum::{
    body::Bytes,
    extract::{Path, State},
    middleware,
    routing::{get, patch, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;
use crate::rules::RuleKind;

pub use session::AdminSessions;

pub fn setup_admin_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/admin/endpoints", get(get_endpoints))
        .merge(rule_routes("/admin/rules", RuleKind::Authentication))
        .merge(rule_routes("/admin/autz-rules", RuleKind::Authorization))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/admin/login", post(login))
        .merge(protected)
        .with_state(state)
}

fn rule_routes(prefix: &str, kind: RuleKind) -> Router<AppState> {
    Router::new()
        .route(
            prefix,
            get(move |State(state): State<AppState>| list_rules(state, kind)).post(
                move |State(state): State<AppState>, body: Bytes| create_rule(state, kind, body),
            ),
        )
        .route(
            &format!("{}/{{id}}", prefix),
            patch(
                move |State(state): State<AppState>, Path(id): Path<String>, body: Bytes| {
                    update_rule(state, kind, id, body)
                },
            )
            .delete(move |State(state): State<AppState>, Path(id): Path<String>| {
                delete_rule(state, kind, id)
            }),
        )
}
