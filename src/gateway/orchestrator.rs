//! Per-request control flow.
//!
//! ```text
//! Start → Authenticating? → Authorizing? → Discovering → Forwarding → Done
//!            └──────────────────┴───────────────┴─────────────┴→ Errored
//! ```
//!
//! Each stage either advances or ends the request with a [`GatewayError`].

use axum::{
    body::{Body, Bytes},
    http::{request::Parts, Request},
    response::{IntoResponse, Response},
};

use crate::auth::{extract_bearer_token, Identity};
use crate::discovery::DiscoveryRecord;
use crate::gateway::context::GatewayContext;
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::routing::RouteTarget;
use crate::rules::RuleKind;
use crate::security::{authorize, authorize_role, headers};

#[derive(Debug)]
enum Stage {
    Start,
    Authenticating,
    Authorizing,
    Discovering,
    Forwarding(DiscoveryRecord),
}

/// Run the full pipeline for a non-reserved request.
pub async fn handle(ctx: &GatewayContext, request: Request<Body>) -> Response {
    match orchestrate(ctx, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn orchestrate(ctx: &GatewayContext, request: Request<Body>) -> GatewayResult<Response> {
    let (mut parts, body) = request.into_parts();
    headers::strip_identity(&mut parts.headers, &ctx.identity_header);

    let body = read_body(body, ctx.config.proxy.max_body_size).await?;
    let target = RouteTarget::from_request(&parts.uri, &parts.headers);
    let mut identity: Option<Identity> = None;
    let mut stage = Stage::Start;

    loop {
        tracing::debug!(stage = ?stage, path = %target.path, "Orchestrating");
        stage = match stage {
            Stage::Start if ctx.config.auth.enabled => Stage::Authenticating,
            Stage::Start => after_authentication(ctx),
            Stage::Authenticating => {
                identity = authenticate(ctx, &parts, &body, &target).await?;
                after_authentication(ctx)
            }
            Stage::Authorizing => {
                check_authorization(ctx, &parts, &target, identity.as_ref()).await?;
                Stage::Discovering
            }
            Stage::Discovering => {
                let record = ctx
                    .discovery
                    .resolve(&target.path, parts.method.as_str())
                    .await?;
                Stage::Forwarding(record)
            }
            Stage::Forwarding(record) => {
                if let Some(identity) = &identity {
                    headers::inject_identity(&mut parts.headers, &ctx.identity_header, &identity.user);
                }
                tracing::info!(
                    method = %parts.method,
                    url = %format!("http://{}:{}{}", record.address, record.port, target.path),
                    "Redirecting request"
                );
                let response = ctx
                    .forwarder
                    .forward(&record.address, record.port, &parts, body)
                    .await?;
                return Ok(response);
            }
        };
    }
}

fn after_authentication(ctx: &GatewayContext) -> Stage {
    if ctx.config.authorization.enabled {
        Stage::Authorizing
    } else {
        Stage::Discovering
    }
}

/// Work out who the caller is.
///
/// Routes an authentication rule covers require a valid token. Elsewhere a
/// token is still validated when present, but any failure leaves the caller
/// anonymous.
async fn authenticate(
    ctx: &GatewayContext,
    parts: &Parts,
    body: &Bytes,
    target: &RouteTarget,
) -> GatewayResult<Option<Identity>> {
    let rules = ctx
        .rules
        .get_by_service(RuleKind::Authentication, &target.service)
        .await?;
    let protected = authorize(&rules, &target.url, parts.method.as_str());

    if let Err(e) = extract_bearer_token(&parts.headers) {
        if protected {
            return Err(e.into());
        }
        tracing::debug!(url = %target.url, "No token on unprotected route, continuing anonymously");
        return Ok(None);
    }

    match ctx.auth.validate_token(&parts.headers, body.clone()).await {
        Ok(identity) => {
            tracing::debug!(user = %identity.user, role = ?identity.role, "Caller authenticated");
            Ok(Some(identity))
        }
        Err(e) if !protected => {
            tracing::debug!(url = %target.url, error = %e, "Token not validated on unprotected route, continuing anonymously");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn check_authorization(
    ctx: &GatewayContext,
    parts: &Parts,
    target: &RouteTarget,
    identity: Option<&Identity>,
) -> GatewayResult<()> {
    let rules = ctx
        .rules
        .get_by_service(RuleKind::Authorization, &target.service)
        .await?;
    let role = identity.and_then(|i| i.role.as_deref());

    if authorize_role(&rules, &target.url, parts.method.as_str(), role) {
        Ok(())
    } else {
        Err(GatewayError::Unauthorized)
    }
}

/// Buffer a request body, refusing anything above `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> GatewayResult<Bytes> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| GatewayError::PayloadTooLarge { limit })
}
