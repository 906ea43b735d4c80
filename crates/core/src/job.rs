//! Job submission payloads and per-URL processing results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::limits::MAX_SUBMISSION_URLS;

/// A batch of job-posting URLs submitted for ingestion.
///
/// Transient: consumed entirely by the ingestion pipeline. When the source
/// is an email trace (`source == "email"`) and `source_id` is present, the
/// crawl actor also reflects per-URL outcomes into the email-link table.
/// Bounds are enforced by [`JobUrlSubmission::check`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobUrlSubmission {
    pub urls: Vec<String>,

    /// Source tag, e.g. "job_posting", "email", "scrape".
    pub source: String,

    /// Identifier of the originating record (email id, crawl id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    /// Free-form metadata forwarded to the pipeline's candidate resolvers
    /// (e.g. `company_name`, `company_url`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl JobUrlSubmission {
    pub fn new(urls: Vec<String>, source: impl Into<String>) -> Self {
        Self {
            urls,
            source: source.into(),
            source_id: None,
            metadata: None,
        }
    }

    /// Validate bounds, surfacing the unified error type.
    pub fn check(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(Error::validation("urls must be non-empty"));
        }
        if self.urls.len() > MAX_SUBMISSION_URLS {
            return Err(Error::validation(format!(
                "submission has {} urls, exceeds {} limit",
                self.urls.len(),
                MAX_SUBMISSION_URLS
            )));
        }
        if self.source.is_empty() {
            return Err(Error::validation("source is required"));
        }
        Ok(())
    }

    /// Whether this submission should be mirrored into the email-link table.
    pub fn is_email_trace(&self) -> bool {
        self.source == "email" && self.source_id.is_some()
    }

    /// Read a string field out of the metadata object.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Per-URL outcome of a batch submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlResult {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlResult {
    pub fn ok(url: impl Into<String>, job_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            success: true,
            job_id,
            error: None,
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            job_id: None,
            error: Some(error.into()),
        }
    }
}

/// Summary of a batch submission: one entry per URL, failures never abort
/// sibling URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub success: bool,
    pub processed_count: usize,
    pub failed_count: usize,
    pub results: Vec<UrlResult>,
}

impl SubmissionSummary {
    pub fn from_results(results: Vec<UrlResult>) -> Self {
        let processed_count = results.iter().filter(|r| r.success).count();
        let failed_count = results.len() - processed_count;
        Self {
            // success reflects that the operation ran to completion, not
            // that every URL ingested.
            success: true,
            processed_count,
            failed_count,
            results,
        }
    }
}

/// One job posting payload handed to the ingestion pipeline.
///
/// Everything is optional; the pipeline's candidate resolvers decide what
/// can be salvaged. A payload that resolves no company domain is a recorded
/// skip, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPayload {
    /// URL of the posting itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Application URL when distinct from the posting URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
    /// Explicit company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Explicit company website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Careers page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub careers_url: Option<String>,
    /// Raw HTML of the posting, if captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Plain-text body or description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Source tag carried through to the snapshot row.
    #[serde(default)]
    pub source: String,
    /// Submission metadata (company_name / company_url fallbacks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl JobPayload {
    /// Build a payload for one URL of a submission, carrying the
    /// submission-level source and metadata along.
    pub fn from_submission_url(url: &str, submission: &JobUrlSubmission) -> Self {
        Self {
            url: Some(url.to_string()),
            source: submission.source.clone(),
            metadata: submission.metadata.clone(),
            ..Default::default()
        }
    }

    /// Read a string field out of the metadata object.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_bounds() {
        let sub = JobUrlSubmission::new(vec![], "scrape");
        assert!(sub.check().is_err());

        let sub = JobUrlSubmission::new(vec!["https://a.com/jobs/1".into()], "");
        assert!(sub.check().is_err());

        let sub = JobUrlSubmission::new(vec!["https://a.com/jobs/1".into()], "scrape");
        assert!(sub.check().is_ok());
    }

    #[test]
    fn test_email_trace_detection() {
        let mut sub = JobUrlSubmission::new(vec!["https://a.com/jobs/1".into()], "email");
        assert!(!sub.is_email_trace());
        sub.source_id = Some("email-42".into());
        assert!(sub.is_email_trace());

        let mut sub = JobUrlSubmission::new(vec!["https://a.com/jobs/1".into()], "scrape");
        sub.source_id = Some("x".into());
        assert!(!sub.is_email_trace());
    }

    #[test]
    fn test_summary_counts() {
        let summary = SubmissionSummary::from_results(vec![
            UrlResult::ok("https://a.com/1", Some("job-1".into())),
            UrlResult::failed("https://a.com/2", "no company resolved"),
            UrlResult::ok("https://a.com/3", None),
        ]);
        assert!(summary.success);
        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.processed_count + summary.failed_count, summary.results.len());
    }

    #[test]
    fn test_metadata_lookup() {
        let mut sub = JobUrlSubmission::new(vec!["https://a.com/jobs/1".into()], "scrape");
        sub.metadata = Some(serde_json::json!({"company_name": "Acme", "company_url": ""}));
        assert_eq!(sub.metadata_str("company_name"), Some("Acme"));
        // Empty strings are treated as absent
        assert_eq!(sub.metadata_str("company_url"), None);
        assert_eq!(sub.metadata_str("missing"), None);
    }
}
