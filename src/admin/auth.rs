use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::extract_bearer_token;
use crate::http::server::AppState;

/// Require a live admin session token on every admin route it wraps.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorized = extract_bearer_token(request.headers())
        .is_ok_and(|token| state.sessions.is_valid(token));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Admin request without a valid session");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid or expired admin token." })),
    )
        .into_response()
}
