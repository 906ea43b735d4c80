//! End-to-end crawl flow over the HTTP surface.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext, setup::TEST_TOKEN};
use serde_json::Value;

#[tokio::test]
async fn test_discovery_to_completion_in_two_batches() {
    let ctx = TestContext::with_discovered_urls(fixtures::job_urls(10));
    let server = ctx.server();

    let response = server
        .post("/sites/acme/start-discovery")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::discovery_body("https://acme.com"))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["discovered_count"], 10);
    assert_eq!(body["status"], "discovering");

    let response = server
        .get("/sites/acme/status")
        .authorization_bearer(TEST_TOKEN)
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total_discovered"], 10);
    assert_eq!(body["crawled_count"], 0);

    // First batch of five
    let response = server
        .post("/sites/acme/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 5 }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["crawled_in_batch"], 5);
    assert_eq!(body["total_crawled"], 5);
    assert_eq!(body["status"], "crawling");

    // Second batch finishes the crawl
    let response = server
        .post("/sites/acme/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 5 }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["total_crawled"], 10);
    assert_eq!(body["status"], "completed");

    // Terminal no-op
    let response = server
        .post("/sites/acme/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 5 }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["crawled_in_batch"], 0);
    assert_eq!(body["status"], "completed");

    // The fetcher saw exactly the two batches, and every posting landed.
    let batches = ctx.fetcher.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 5);
    assert_eq!(batches[1].len(), 5);
    assert_eq!(ctx.store.company_count(), 10);
    // Crawled postings carry page content, so each one snapshots.
    assert_eq!(ctx.store.snapshot_count(), 10);
}

#[tokio::test]
async fn test_oversized_batch_is_clamped() {
    let ctx = TestContext::with_discovered_urls(fixtures::job_urls(3));
    let server = ctx.server();

    server
        .post("/sites/small/start-discovery")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::discovery_body("https://small.com"))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/sites/small/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 10 }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["crawled_in_batch"], 3);
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_zero_batch_size_rejected() {
    let ctx = TestContext::with_discovered_urls(fixtures::job_urls(3));
    let server = ctx.server();

    server
        .post("/sites/zero/start-discovery")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::discovery_body("https://zero.com"))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/sites/zero/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "CRAWL_002");
}

#[tokio::test]
async fn test_fetch_failure_leaves_progress_untouched() {
    let ctx = TestContext::with_discovered_urls(fixtures::job_urls(4));
    let server = ctx.server();

    server
        .post("/sites/flaky/start-discovery")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::discovery_body("https://flaky.com"))
        .await
        .assert_status(StatusCode::OK);

    ctx.fetcher.set_should_fail(true);
    let response = server
        .post("/sites/flaky/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 2 }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = server
        .get("/sites/flaky/status")
        .authorization_bearer(TEST_TOKEN)
        .await
        .json();
    assert_eq!(body["crawled_count"], 0);

    // The same batch succeeds on retry.
    ctx.fetcher.set_should_fail(false);
    let body: Value = server
        .post("/sites/flaky/crawl-urls")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "batch_size": 2 }))
        .await
        .json();
    assert_eq!(body["crawled_in_batch"], 2);
    assert_eq!(body["total_crawled"], 2);
}

#[tokio::test]
async fn test_invalid_base_url_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/sites/bad/start-discovery")
        .authorization_bearer(TEST_TOKEN)
        .json(&serde_json::json!({ "base_url": "not a url" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}
