//! Company and content-snapshot models.
//!
//! Logical schema:
//! - `companies(id, name, normalized_domain UNIQUE, website_url, careers_url,
//!   description, created_at, updated_at)`
//! - `company_benefits_snapshots(id, company_id, source, source_url,
//!   snapshot_text, parsed, extracted_at)`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

/// A company row. Created on first sighting of a normalized domain; merged,
/// never deleted, by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    /// Unique dedup key: lower-cased host, scheme/path stripped.
    pub normalized_domain: String,
    pub website_url: Option<String>,
    pub careers_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// New row for a first-sighted domain. Falls back to the domain itself
    /// when no name was resolved.
    pub fn new(normalized_domain: String, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.unwrap_or_else(|| normalized_domain.clone()),
            normalized_domain,
            website_url: None,
            careers_url: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A point-in-time extracted benefits/content snapshot for a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub id: String,
    pub company_id: String,
    /// Source tag, e.g. "job_posting".
    pub source: String,
    pub source_url: Option<String>,
    /// Whitespace-normalized snapshot text; part of the dedup key.
    pub snapshot_text: String,
    /// Parsed structured fields.
    pub parsed: Value,
    pub extracted_at: DateTime<Utc>,
}

impl ContentSnapshot {
    pub fn new(
        company_id: impl Into<String>,
        source: impl Into<String>,
        source_url: Option<String>,
        snapshot_text: impl Into<String>,
        parsed: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.into(),
            source: source.into(),
            source_url,
            snapshot_text: snapshot_text.into(),
            parsed,
            extracted_at: Utc::now(),
        }
    }
}

/// Compute the normalized domain for a URL: the host component,
/// lower-cased, with any `www.` prefix stripped. Scheme, port, and path are
/// ignored. Bare hosts without a scheme are accepted.
pub fn normalized_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", trimmed)).ok())?;

    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_domain_variants() {
        assert_eq!(
            normalized_domain("https://acme.com/careers"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            normalized_domain("http://WWW.Acme.COM/jobs/1?x=1"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            normalized_domain("acme.com"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            normalized_domain("https://jobs.acme.co.uk:8443/listings"),
            Some("jobs.acme.co.uk".to_string())
        );
    }

    #[test]
    fn test_normalized_domain_rejects_unusable_input() {
        assert_eq!(normalized_domain(""), None);
        assert_eq!(normalized_domain("   "), None);
        assert_eq!(normalized_domain("not a url"), None);
        assert_eq!(normalized_domain("localhost"), None);
    }

    #[test]
    fn test_company_name_falls_back_to_domain() {
        let company = Company::new("acme.com".into(), None);
        assert_eq!(company.name, "acme.com");

        let company = Company::new("acme.com".into(), Some("Acme Inc".into()));
        assert_eq!(company.name, "Acme Inc");
    }
}
