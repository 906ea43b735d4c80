//! Service-token gate at the HTTP boundary.

use axum::http::StatusCode;
use integration_tests::{setup::TestContext, setup::TEST_TOKEN};
use serde_json::Value;

#[tokio::test]
async fn test_missing_token_returns_401() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/sites/acme/status").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "AUTH_001");
}

#[tokio::test]
async fn test_wrong_token_returns_401() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/sites/acme/status")
        .authorization_bearer("wrong-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "AUTH_002");
}

#[tokio::test]
async fn test_service_token_header_accepted() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/sites/acme/status")
        .add_header("X-Service-Token", TEST_TOKEN)
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn test_health_is_not_gated() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/health/live").await.assert_status(StatusCode::OK);
}
