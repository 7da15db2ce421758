use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::gateway::{GatewayError, GatewayResult};
use crate::http::server::AppState;
use crate::rules::{NewRule, Rule, RuleKind, RulePatch};

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub token: String,
}

fn login_error(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> Response {
    let Ok(credentials) = serde_json::from_slice::<Credentials>(&body) else {
        return login_error("Something went wrong!.");
    };

    let admin = &state.config.admin;
    if credentials.username != admin.username || credentials.password != admin.password {
        tracing::warn!(username = %credentials.username, "Admin login failed");
        return login_error("Wrong username or password!.");
    }

    let token = state.sessions.issue();
    tracing::info!(username = %credentials.username, "Admin session opened");
    Json(LoginResponse {
        id: Uuid::new_v4().to_string(),
        token,
    })
    .into_response()
}

pub async fn get_endpoints(State(state): State<AppState>) -> GatewayResult<Json<serde_json::Value>> {
    Ok(Json(state.discovery.endpoints().await?))
}

pub async fn list_rules(state: AppState, kind: RuleKind) -> GatewayResult<Json<Vec<Rule>>> {
    Ok(Json(state.rules.get_all(kind).await?))
}

pub async fn create_rule(state: AppState, kind: RuleKind, body: Bytes) -> GatewayResult<Json<Rule>> {
    let rule: NewRule = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid rule: {}", e)))?;
    if rule.service.trim().is_empty() || rule.pattern.trim().is_empty() {
        return Err(GatewayError::BadRequest(
            "A rule needs a service and a pattern.".to_string(),
        ));
    }
    Ok(Json(state.rules.create(kind, rule).await?))
}

pub async fn update_rule(
    state: AppState,
    kind: RuleKind,
    id: String,
    body: Bytes,
) -> GatewayResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    let patch: RulePatch = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid rule: {}", e)))?;
    state.rules.update(kind, id, patch).await?;
    Ok(Json(json!({})))
}

pub async fn delete_rule(
    state: AppState,
    kind: RuleKind,
    id: String,
) -> GatewayResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    state.rules.delete(kind, id).await?;
    Ok(Json(json!({})))
}

fn parse_id(id: &str) -> GatewayResult<u64> {
    id.parse()
        .map_err(|_| GatewayError::BadRequest(format!("Invalid rule id {:?}.", id)))
}
