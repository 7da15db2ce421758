//! Shared utilities for integration testing.
//!
//! Every mock binds `127.0.0.1:0`, so tests can run in parallel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_gateway::config::GatewayConfig;
use api_gateway::http::AppState;
use api_gateway::rules::MemoryRuleStore;
use api_gateway::{HttpServer, Shutdown};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const VALID_TOKEN: &str = "merchant-token";
pub const ADMIN_ROLE_TOKEN: &str = "admin-token";

/// Serve `router` on an ephemeral port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A port nothing listens on.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Service that accepts connections and never answers.
pub async fn start_silent_service() -> SocketAddr {
    async fn hang() -> Response {
        std::future::pending::<()>().await;
        StatusCode::OK.into_response()
    }

    serve(Router::new().fallback(hang)).await
}

/// Backend that echoes the request body and reports what it saw in headers.
///
/// `?status=<code>` makes it answer with that status.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        body: Bytes,
    ) -> Response {
        let status = query
            .get("status")
            .and_then(|s| s.parse().ok())
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::OK);
        let user = headers
            .get("x-user")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none")
            .to_string();

        let mut response = (status, body).into_response();
        let out = response.headers_mut();
        out.insert("x-echo-method", HeaderValue::from_str(method.as_str()).unwrap());
        out.insert("x-echo-path", HeaderValue::from_str(uri.path()).unwrap());
        out.insert(
            "x-echo-query",
            HeaderValue::from_str(uri.query().unwrap_or("")).unwrap(),
        );
        out.insert("x-echo-user", HeaderValue::from_str(&user).unwrap());
        out.insert(
            "x-echo-user-count",
            HeaderValue::from(headers.get_all("x-user").iter().count()),
        );
        response
    }

    serve(Router::new().fallback(echo)).await
}

type Lookup = Arc<dyn Fn(&str, &str) -> (StatusCode, Value) + Send + Sync>;

/// Discovery mock answering lookups with `lookup(verb, path)`.
pub async fn start_discovery<F>(lookup: F) -> SocketAddr
where
    F: Fn(&str, &str) -> (StatusCode, Value) + Send + Sync + 'static,
{
    async fn microservices(
        State(lookup): State<Lookup>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        let verb = query.get("verb").cloned().unwrap_or_default();
        let path = query.get("path").cloned().unwrap_or_default();
        let (status, body) = lookup(&verb, &path);
        (status, Json(body)).into_response()
    }

    async fn endpoints() -> Json<Value> {
        Json(json!([
            { "name": "order", "verb": "GET", "path": "/order/{id}" },
            { "name": "merchants", "verb": "POST", "path": "/merchants/{id}" },
        ]))
    }

    let lookup: Lookup = Arc::new(lookup);
    serve(
        Router::new()
            .route("/microservices", get(microservices))
            .route("/endpoints", get(endpoints))
            .with_state(lookup),
    )
    .await
}

/// Discovery that sends every request to `backend`.
pub async fn start_discovery_for(backend: SocketAddr) -> SocketAddr {
    let port = backend.port();
    start_discovery(move |_, _| {
        (
            StatusCode::OK,
            json!({ "address": "127.0.0.1", "port": port.to_string(), "status": true }),
        )
    })
    .await
}

/// Authentication service mock.
///
/// `validate-token` accepts [`VALID_TOKEN`] (role `merchant`) and
/// [`ADMIN_ROLE_TOKEN`] (role `admin`). Every other `/auth` route reports what it received.
pub async fn start_auth_service() -> SocketAddr {
    async fn validate(headers: HeaderMap) -> Response {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        match auth {
            a if a == format!("Bearer {}", VALID_TOKEN) => {
                Json(json!({ "uuid": "user-1", "role": "merchant" })).into_response()
            }
            a if a == format!("Bearer {}", ADMIN_ROLE_TOKEN) => {
                Json(json!({ "uuid": "admin-1", "role": "admin" })).into_response()
            }
            _ => (StatusCode::BAD_REQUEST, "invalid token").into_response(),
        }
    }

    async fn other(method: Method, uri: Uri, body: Bytes) -> Json<Value> {
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    serve(
        Router::new()
            .route("/auth/validate-token", post(validate))
            .route("/auth", any(other))
            .route("/auth/{*rest}", any(other)),
    )
    .await
}

/// Config pointing at the given discovery service, everything else unreachable.
pub fn config_for(discovery: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.discovery.host = "127.0.0.1".into();
    config.discovery.port = discovery.port();
    config.discovery.timeout_secs = 2;
    config.auth.host = "127.0.0.1".into();
    config.auth.port = unused_port();
    config.auth.timeout_secs = 2;
    config.proxy.timeout_secs = 2;
    config
}

/// A running gateway.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: AppState,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let server = HttpServer::new(config, Arc::new(MemoryRuleStore::default())).unwrap();
    let state = server.state().clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    TestGateway {
        addr,
        state,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
