//! Text extraction and benefits parsing.
//!
//! HTML is reduced to plain text, whitespace-normalized, then run through a
//! [`BenefitsExtractor`]. The AI-backed classifier is an external
//! collaborator; the shipped [`KeywordExtractor`] is a deterministic
//! heuristic behind the same seam.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

use hub_core::Result;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("invalid script regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("invalid tag regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

/// Collapse all whitespace runs to single spaces and trim.
///
/// The snapshot dedup key is exact text, not a content hash, so this
/// normalization is what prevents spurious duplicates from formatting-only
/// differences.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Strip HTML down to plain text: script/style contents dropped, tags
/// removed, common entities decoded, whitespace normalized.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_scripts, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    normalize_whitespace(&decoded)
}

/// Output of benefits extraction: the normalized snapshot string (the dedup
/// key) plus the parsed structured fields.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub snapshot_text: String,
    pub parsed: Value,
}

/// Seam for the content classifier. Implementations may call out to an AI
/// model; calls are suspension points for the owning actor.
#[async_trait]
pub trait BenefitsExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Extraction>;
}

/// Deterministic keyword-based extractor used when no AI classifier is
/// wired in.
#[derive(Debug, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    const BENEFIT_KEYWORDS: [&'static str; 14] = [
        "health insurance",
        "dental",
        "vision",
        "401k",
        "401(k)",
        "pension",
        "pto",
        "paid time off",
        "parental leave",
        "remote",
        "flexible hours",
        "equity",
        "stock options",
        "tuition",
    ];
}

#[async_trait]
impl BenefitsExtractor for KeywordExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction> {
        let snapshot_text = normalize_whitespace(text);
        let lowered = snapshot_text.to_lowercase();

        let benefits: Vec<&str> = Self::BENEFIT_KEYWORDS
            .iter()
            .copied()
            .filter(|kw| lowered.contains(kw))
            .collect();

        let parsed = json!({
            "benefits": benefits,
            "word_count": snapshot_text.split_whitespace().count(),
        });

        Ok(Extraction {
            snapshot_text,
            parsed,
        })
    }
}
