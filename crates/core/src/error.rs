//! Unified error types for the scrape hub.
//!
//! Error codes are grouped by subsystem:
//! - AUTH_001-002: Authentication errors
//! - HUB_001-005: Connection hub errors
//! - CRAWL_001-002: Crawl state machine errors
//! - INGEST_001: Ingestion/store errors
//! - VALID_001: Validation errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Authentication error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// AUTH_001: Bearer token is required
    MissingToken,
    /// AUTH_002: Bearer token does not match
    InvalidToken,
}

impl AuthErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "AUTH_001",
            Self::InvalidToken => "AUTH_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        401
    }
}

/// Connection hub error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubErrorCode {
    /// HUB_001: No worker connection available for dispatch
    NoWorkerAvailable,
    /// HUB_002: Correlation id already has a pending command
    DuplicateCorrelationId,
    /// HUB_003: Issuing connection disconnected before the reply
    PeerDisconnected,
    /// HUB_004: Pending command released by the timeout sweep
    CommandTimeout,
    /// HUB_005: Message could not be parsed or lacked a command type
    MalformedMessage,
}

impl HubErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoWorkerAvailable => "HUB_001",
            Self::DuplicateCorrelationId => "HUB_002",
            Self::PeerDisconnected => "HUB_003",
            Self::CommandTimeout => "HUB_004",
            Self::MalformedMessage => "HUB_005",
        }
    }

    /// Get the HTTP status code for hub errors surfaced over HTTP.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NoWorkerAvailable => 503,
            Self::DuplicateCorrelationId => 409,
            Self::PeerDisconnected => 410,
            Self::CommandTimeout => 504,
            Self::MalformedMessage => 400,
        }
    }
}

/// Crawl state machine error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlErrorCode {
    /// CRAWL_001: Discovery provider call failed
    DiscoveryFailed,
    /// CRAWL_002: Batch size must be a positive integer
    InvalidBatchSize,
}

impl CrawlErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DiscoveryFailed => "CRAWL_001",
            Self::InvalidBatchSize => "CRAWL_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::DiscoveryFailed => 502,
            Self::InvalidBatchSize => 400,
        }
    }
}

/// Ingestion/store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorCode {
    /// INGEST_001: Store read or write failed
    StoreFailed,
}

impl IngestErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreFailed => "INGEST_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Unified error type for the scrape hub.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication error with code.
    #[error("[{code}] {message}")]
    Auth {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Connection hub error with code.
    #[error("[{code}] {message}")]
    Hub {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Crawl state machine error with code.
    #[error("[{code}] {message}")]
    Crawl {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Ingestion error with code.
    #[error("[{code}] {message}")]
    Ingest {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown site: {0}")]
    UnknownSite(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an authentication error.
    pub fn auth(code: AuthErrorCode, msg: impl Into<String>) -> Self {
        Self::Auth {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a connection hub error.
    pub fn hub(code: HubErrorCode, msg: impl Into<String>) -> Self {
        Self::Hub {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a crawl error.
    pub fn crawl(code: CrawlErrorCode, msg: impl Into<String>) -> Self {
        Self::Crawl {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create an ingestion error.
    pub fn ingest(code: IngestErrorCode, msg: impl Into<String>) -> Self {
        Self::Ingest {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_site(site_id: impl Into<String>) -> Self {
        Self::UnknownSite(site_id.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Auth { http_status, .. } => *http_status,
            Self::Hub { http_status, .. } => *http_status,
            Self::Crawl { http_status, .. } => *http_status,
            Self::Ingest { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 400,
            Self::UnknownSite(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Auth { code, .. } => Some(code),
            Self::Hub { code, .. } => Some(code),
            Self::Crawl { code, .. } => Some(code),
            Self::Ingest { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this error came out of the pending-command table.
    pub fn is_duplicate_correlation(&self) -> bool {
        self.error_code() == Some("HUB_002")
    }
}
