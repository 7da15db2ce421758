//! Admin login, rule management and endpoint listing.

use serde_json::{json, Value};

mod common;

async fn gateway() -> common::TestGateway {
    let backend = common::start_echo_backend().await;
    let discovery = common::start_discovery_for(backend).await;
    common::start_gateway(common::config_for(discovery)).await
}

async fn login(gateway: &common::TestGateway) -> String {
    let res = common::client()
        .post(gateway.url("/admin/login"))
        .json(&json!({ "username": "admin", "password": "CHANGE_ME_IN_PRODUCTION" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert!(body["id"].is_string());
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_login_without_body() {
    let gateway = gateway().await;
    let res = common::client()
        .post(gateway.url("/admin/login"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Something went wrong!." }));
}

#[tokio::test]
async fn test_login_with_wrong_credentials() {
    let gateway = gateway().await;
    let res = common::client()
        .post(gateway.url("/admin/login"))
        .json(&json!({ "username": "abc", "password": "test" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Wrong username or password!." }));
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let gateway = gateway().await;
    let client = common::client();

    let res = client.get(gateway.url("/admin/rules")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(gateway.url("/admin/autz-rules"))
        .bearer_auth("not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn test_rule_lifecycle() {
    let gateway = gateway().await;
    let token = login(&gateway).await;
    let client = common::client();

    let res = client
        .post(gateway.url("/admin/rules"))
        .bearer_auth(&token)
        .json(&json!({ "service": "order", "rule": "*://*/order/*", "methods": ["GET", "PUT"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["rule"], "*://*/order/*");

    let res = client
        .patch(gateway.url(&format!("/admin/rules/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "methods": ["*"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let rules: Value = client
        .get(gateway.url("/admin/rules"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["methods"], json!(["*"]));
    assert_eq!(rules[0]["service"], "order");

    let res = client
        .patch(gateway.url(&format!("/admin/rules/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "methods": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let rules: Value = client
        .get(gateway.url("/admin/rules"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rules[0]["methods"], Value::Null);
    assert_eq!(rules[0]["rule"], "*://*/order/*");

    // Authorization rules are a separate table.
    let autz: Value = client
        .get(gateway.url("/admin/autz-rules"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(autz, json!([]));

    let res = client
        .delete(gateway.url(&format!("/admin/rules/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .delete(gateway.url("/admin/rules/9999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let rules: Value = client
        .get(gateway.url("/admin/rules"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rules, json!([]));
}

#[tokio::test]
async fn test_malformed_rule_is_bad_request() {
    let gateway = gateway().await;
    let token = login(&gateway).await;
    let client = common::client();

    let res = client
        .post(gateway.url("/admin/autz-rules"))
        .bearer_auth(&token)
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .patch(gateway.url("/admin/autz-rules/abc"))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_authorization_rule_from_admin_api_takes_effect() {
    let backend = common::start_echo_backend().await;
    let discovery = common::start_discovery_for(backend).await;
    let mut config = common::config_for(discovery);
    config.authorization.enabled = true;
    let gateway = common::start_gateway(config).await;
    let token = login(&gateway).await;
    let client = common::client();

    let res = client.post(gateway.url("/merchants/5")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .post(gateway.url("/admin/autz-rules"))
        .bearer_auth(&token)
        .json(&json!({ "service": "*", "rule": "/merchants/*", "methods": ["POST"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client.post(gateway.url("/merchants/5")).send().await.unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_endpoints_listing() {
    let gateway = gateway().await;
    let token = login(&gateway).await;

    let res = common::client()
        .get(gateway.url("/admin/endpoints"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}
