//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the reserved and catch-all routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch non-reserved requests to the orchestrator

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::GatewayConfig;
use crate::gateway::{self, ContextError, GatewayContext, GatewayError};
use crate::rules::RuleStore;
use crate::security::headers;

/// Application state injected into handlers.
pub type AppState = Arc<GatewayContext>;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server over the given rule store.
    pub fn new(config: GatewayConfig, store: Arc<dyn RuleStore>) -> Result<Self, ContextError> {
        let state = Arc::new(GatewayContext::new(config, store)?);
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        let gateway = Router::new()
            .route("/auth", any(auth_passthrough))
            .route("/auth/{service}", any(auth_passthrough))
            .route("/auth/{service}/login", any(auth_passthrough))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state.clone());

        gateway.merge(setup_admin_router(state)).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(request_timeout)),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            auth_enabled = self.state.config.auth.enabled,
            authorization_enabled = self.state.config.authorization.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared gateway state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Span carrying the request ID so every event of a request can be correlated.
fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Everything that is not a reserved route.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    gateway::handle(&state, request).await
}

/// Hand `/auth` routes to the authentication service unchanged.
async fn auth_passthrough(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();
    headers::strip_identity(&mut parts.headers, &state.identity_header);

    let body = match gateway::read_body(body, state.config.proxy.max_body_size).await {
        Ok(body) => body,
        Err(e) => return e.into_response(),
    };

    let sub_path = parts.uri.path().strip_prefix("/auth").unwrap_or_default();
    match state.auth.passthrough(sub_path, &parts, body).await {
        Ok(response) => response,
        Err(e) => GatewayError::from(e).into_response(),
    }
}
