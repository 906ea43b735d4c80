//! Candidate resolution for company fields.
//!
//! "First non-empty of several optional fields" is modelled as an explicit
//! ordered candidate list, so the precedence is a visible contract instead
//! of implicit fallback chaining. Resolution is always first-match-wins,
//! never a deep merge.

use hub_core::{normalized_domain, JobPayload};

/// One named candidate in a precedence list.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Where the value came from, for logging.
    pub origin: &'static str,
    pub value: Option<&'a str>,
}

impl<'a> Candidate<'a> {
    pub fn new(origin: &'static str, value: Option<&'a str>) -> Self {
        Self {
            origin,
            value: value.map(str::trim).filter(|v| !v.is_empty()),
        }
    }
}

/// Evaluate candidates in priority order, returning the first non-empty
/// value and its origin.
pub fn first_non_empty<'a>(candidates: &[Candidate<'a>]) -> Option<(&'static str, &'a str)> {
    candidates
        .iter()
        .find_map(|c| c.value.map(|v| (c.origin, v)))
}

/// Company name precedence: explicit payload name, then metadata.
pub fn resolve_name(payload: &JobPayload) -> Option<String> {
    first_non_empty(&[
        Candidate::new("payload.company_name", payload.company_name.as_deref()),
        Candidate::new("metadata.company_name", payload.metadata_str("company_name")),
    ])
    .map(|(_, v)| v.to_string())
}

/// Website precedence: explicit website, metadata company URL, then the job
/// URL itself.
pub fn resolve_website(payload: &JobPayload) -> Option<String> {
    first_non_empty(&[
        Candidate::new("payload.website", payload.website.as_deref()),
        Candidate::new("metadata.company_url", payload.metadata_str("company_url")),
        Candidate::new("payload.url", payload.url.as_deref()),
    ])
    .map(|(_, v)| v.to_string())
}

/// Resolve the normalized dedup domain: the website's domain, falling back
/// to the job/apply URL's domain. `None` means the payload is a recorded
/// skip ("no company resolved").
pub fn resolve_domain(payload: &JobPayload) -> Option<String> {
    if let Some(website) = resolve_website(payload) {
        if let Some(domain) = normalized_domain(&website) {
            return Some(domain);
        }
    }
    for fallback in [payload.url.as_deref(), payload.apply_url.as_deref()] {
        if let Some(domain) = fallback.and_then(normalized_domain) {
            return Some(domain);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_empty_order() {
        let picked = first_non_empty(&[
            Candidate::new("a", None),
            Candidate::new("b", Some("  ")),
            Candidate::new("c", Some("value")),
            Candidate::new("d", Some("later")),
        ]);
        assert_eq!(picked, Some(("c", "value")));
    }

    #[test]
    fn test_name_prefers_explicit_over_metadata() {
        let mut payload = JobPayload {
            company_name: Some("Acme".into()),
            metadata: Some(serde_json::json!({"company_name": "Acme Metadata"})),
            ..Default::default()
        };
        assert_eq!(resolve_name(&payload).as_deref(), Some("Acme"));

        payload.company_name = None;
        assert_eq!(resolve_name(&payload).as_deref(), Some("Acme Metadata"));

        payload.metadata = None;
        assert_eq!(resolve_name(&payload), None);
    }

    #[test]
    fn test_website_falls_back_to_job_url() {
        let payload = JobPayload {
            url: Some("https://acme.com/jobs/1".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_website(&payload).as_deref(),
            Some("https://acme.com/jobs/1")
        );
    }

    #[test]
    fn test_domain_from_website_then_apply_url() {
        let payload = JobPayload {
            website: Some("https://www.acme.com".into()),
            ..Default::default()
        };
        assert_eq!(resolve_domain(&payload).as_deref(), Some("acme.com"));

        // Unusable website string falls through to the apply URL
        let payload = JobPayload {
            website: Some("not a url".into()),
            apply_url: Some("https://jobs.acme.com/apply/1".into()),
            ..Default::default()
        };
        assert_eq!(resolve_domain(&payload).as_deref(), Some("jobs.acme.com"));

        let payload = JobPayload::default();
        assert_eq!(resolve_domain(&payload), None);
    }

    #[test]
    fn test_careers_and_job_url_share_domain() {
        // Two payloads for the same company must resolve identically
        let a = JobPayload {
            website: Some("https://acme.com/careers".into()),
            ..Default::default()
        };
        let b = JobPayload {
            url: Some("https://acme.com/jobs/1".into()),
            ..Default::default()
        };
        assert_eq!(resolve_domain(&a), resolve_domain(&b));
    }
}
