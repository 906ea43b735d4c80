//! URL submission and ingestion behavior over the HTTP surface.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext, setup::TEST_TOKEN};
use job_store::{EmailLinkStore, LinkStatus};
use serde_json::Value;

#[tokio::test]
async fn test_submission_creates_companies() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let urls = fixtures::job_urls(3);

    let response = server
        .post("/sites/board/process-job-url")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::submission_body(&urls, "job_board"))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["processed_count"], 3);
    assert_eq!(body["failed_count"], 0);

    // URL submissions carry no page content, so resolution stops at the
    // company and no snapshot is stored.
    assert_eq!(ctx.store.company_count(), 3);
    assert_eq!(ctx.store.snapshot_count(), 0);
}

#[tokio::test]
async fn test_resubmission_reuses_companies() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let urls = fixtures::job_urls(3);

    for _ in 0..2 {
        let response = server
            .post("/sites/board/process-job-url")
            .authorization_bearer(TEST_TOKEN)
            .json(&fixtures::submission_body(&urls, "job_board"))
            .await;
        response.assert_status(StatusCode::OK);
    }

    // Second pass matched the existing companies by domain.
    assert_eq!(ctx.store.company_count(), 3);
}

#[tokio::test]
async fn test_partial_batch_reports_per_url_results() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let urls = vec![
        "https://good.com/jobs/1".to_string(),
        "not-a-url".to_string(),
    ];

    let response = server
        .post("/sites/board/process-job-url")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::submission_body(&urls, "job_board"))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();

    // Batch-level success reflects completion, not per-URL outcomes.
    assert_eq!(body["success"], true);
    assert_eq!(body["processed_count"], 1);
    assert_eq!(body["failed_count"], 1);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(ctx.store.company_count(), 1);
}

#[tokio::test]
async fn test_empty_url_list_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/sites/board/process-job-url")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::submission_body(&[], "job_board"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_url_list_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let urls = fixtures::job_urls(501);

    let response = server
        .post("/sites/board/process-job-url")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::submission_body(&urls, "job_board"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_email_submission_records_link_outcomes() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let urls = vec![
        "https://mailed.com/jobs/1".to_string(),
        "not-a-url".to_string(),
    ];

    let response = server
        .post("/sites/board/process-job-url")
        .authorization_bearer(TEST_TOKEN)
        .json(&fixtures::email_submission(&urls, "msg-42"))
        .await;
    response.assert_status(StatusCode::OK);

    let links = ctx.store.links_for_source("msg-42").await.unwrap();
    assert_eq!(links.len(), 2);
    let completed = links
        .iter()
        .filter(|l| l.status == LinkStatus::Completed)
        .count();
    let failed = links
        .iter()
        .filter(|l| l.status == LinkStatus::Failed)
        .count();
    assert_eq!(completed, 1);
    assert_eq!(failed, 1);
}
