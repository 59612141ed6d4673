//! Unified Error Type System
//!
//! Centralized error types for the whole exporter.
//! Classifies remote failures so the retry layer can decide what to repeat.
//!
//! ## Error Categories
//!
//! - **Auth**: Bad or expired personal access token (fail fast)
//! - **NotFound**: Unknown organization, project, wiki or page
//! - **RateLimit**: Throttled by the service (retry after a delay)
//! - **Network**: Connectivity issues (retry with backoff)
//! - **Transient**: 5xx responses that may resolve on their own
//! - **BadRequest**: Rejected request, retrying will not help

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used for retry decisions and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication or authorization failed
    Auth,
    /// Resource does not exist
    NotFound,
    /// Rate limited by the service
    RateLimit,
    /// Connection, DNS or transport failure
    Network,
    /// Temporary server-side failure
    Transient,
    /// Request rejected as invalid
    BadRequest,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Network => write!(f, "NETWORK"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if a request that failed with this category may be repeated
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Failed request against the remote wiki service
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category for retry decisions
    pub category: ErrorCategory,
    /// HTTP status, if the service answered at all
    pub status: Option<u16>,
    /// Request URL (never contains credentials)
    pub url: String,
    /// Detailed error message
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "[{}:{}] {} ({})",
                self.category, status, self.message, self.url
            ),
            None => write!(f, "[{}] {} ({})", self.category, self.message, self.url),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(category: ErrorCategory, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            status: None,
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps HTTP statuses and transport failures to error categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code
    pub fn classify_http_status(status: u16, url: &str, message: &str) -> ApiError {
        let category = match status {
            401 | 403 => ErrorCategory::Auth,
            // Azure DevOps answers 203 with a sign-in page for a rejected PAT
            203 => ErrorCategory::Auth,
            404 => ErrorCategory::NotFound,
            429 => ErrorCategory::RateLimit,
            400 | 405 | 409 | 413 | 422 => ErrorCategory::BadRequest,
            408 | 500 | 502 | 503 | 504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        ApiError::new(category, url, message).with_status(status)
    }

    /// Classify a transport-level failure reported by reqwest
    pub fn classify_transport(err: &reqwest::Error, url: &str) -> ApiError {
        let category = if err.is_connect() || err.is_timeout() || err.is_request() {
            ErrorCategory::Network
        } else if err.is_body() || err.is_decode() {
            ErrorCategory::Transient
        } else {
            ErrorCategory::Unknown
        };
        let mut api_err = ApiError::new(category, url, err.to_string());
        if let Some(status) = err.status() {
            api_err = api_err.with_status(status.as_u16());
        }
        api_err
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum WikiError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Remote Errors
    // -------------------------------------------------------------------------
    #[error("Request failed: {0}")]
    Api(ApiError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Response did not have the expected shape (missing keys, cyclic tree)
    #[error("Malformed response from {context}: {message}")]
    Malformed { context: String, message: String },

    // -------------------------------------------------------------------------
    // Local Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure while exporting one wiki
    #[error("Export of wiki '{wiki}' failed: {source}")]
    Export {
        wiki: String,
        #[source]
        source: Box<WikiError>,
    },
}

impl From<ApiError> for WikiError {
    fn from(err: ApiError) -> Self {
        WikiError::Api(err)
    }
}

pub type Result<T> = std::result::Result<T, WikiError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl WikiError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a malformed-response error
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Attach the wiki being exported
    pub fn in_wiki(self, wiki: impl Into<String>) -> Self {
        Self::Export {
            wiki: wiki.into(),
            source: Box::new(self),
        }
    }

    /// Category of the underlying remote failure, if any
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Api(e) => Some(e.category),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            Self::Export { source, .. } => source.category(),
            _ => None,
        }
    }

    /// Check if repeating the failed request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
