//! Test data builders.

use serde_json::{json, Value};

/// URLs on distinct domains, one company each.
pub fn job_urls(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("https://company{}.com/jobs/{}", i, i))
        .collect()
}

/// URL submission body for /process-job-url.
pub fn submission_body(urls: &[String], source: &str) -> Value {
    json!({ "urls": urls, "source": source })
}

/// Email-sourced submission carrying a trace id.
pub fn email_submission(urls: &[String], source_id: &str) -> Value {
    json!({ "urls": urls, "source": "email", "source_id": source_id })
}

pub fn discovery_body(base_url: &str) -> Value {
    json!({ "base_url": base_url, "search_terms": ["engineering"] })
}
