//! Core types, errors, and wire messages for the scrape hub.

pub mod auth;
pub mod company;
pub mod error;
pub mod job;
pub mod limits;
pub mod message;

pub use auth::{extract_bearer_token, ServiceToken};
pub use company::{normalized_domain, Company, ContentSnapshot};
pub use error::{
    AuthErrorCode, CrawlErrorCode, Error, HubErrorCode, IngestErrorCode, Result,
};
pub use job::{JobPayload, JobUrlSubmission, SubmissionSummary, UrlResult};
pub use message::{ClientRole, Envelope, InboundMessage, WireMessage};
