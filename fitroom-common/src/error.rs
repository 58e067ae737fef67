// ================================================================
// File: fitroom-common/src/error.rs
// ================================================================

use thiserror::Error;

/// How a generation-provider failure was classified from the provider's
/// HTTP status and response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Bad or missing API key, or a misconfigured endpoint (401/403).
    Auth,
    /// Provider-side rate limit (429).
    RateLimited,
    /// The provider rejected the request payload (400).
    InvalidRequest,
    /// The call succeeded but the result list was empty.
    EmptyResult,
    /// The response body could not be interpreted.
    Malformed,
    /// Any other provider-reported failure.
    Upstream,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Profile provisioning error: {0}")]
    Provisioning(String),

    #[error("Generation provider error ({kind:?}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),
}

impl Error {
    /// Constructor shorthand for classified provider errors.
    pub fn provider(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Error::Provider {
            kind,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
