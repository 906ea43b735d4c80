//! Health endpoint behavior.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_components() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["hub_healthy"], true);
    assert_eq!(body["store_healthy"], true);
    assert!(body["status"].is_string());
}

#[tokio::test]
async fn test_readiness_and_liveness() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/health/ready").await.assert_status(StatusCode::OK);
    server.get("/health/live").await.assert_status(StatusCode::OK);
}
