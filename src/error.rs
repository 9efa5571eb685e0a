//! Huginn error types

use std::time::Duration;

/// Huginn error types.
///
/// Provider failures are classified into this taxonomy at the transport
/// boundary (see [`HuginnError::classify`]); production code paths match
/// on variants, never on message strings.
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    /// Provider reported quota exhaustion or rate limiting.
    ///
    /// Both are retriable here; `retry_after` carries a provider hint
    /// (e.g. a `Retry-After` header) when one was given.
    #[error("quota exceeded, retry after {retry_after:?}")]
    QuotaExceeded { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    /// The provider rejected the request as malformed. Not retriable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level connectivity failure (connection reset, timeout,
    /// host unreachable). Retriable.
    #[error("provider unreachable: {0}")]
    ProviderUnreachable(String),

    /// Catch-all for provider errors that fit no other variant.
    /// Carries the original message.
    #[error("provider error: {0}")]
    Provider(String),

    // Transport/data errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty completion from provider")]
    EmptyResponse,

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HuginnError {
    /// Whether this error is worth retrying.
    ///
    /// Quota/rate-limit signals and transport faults are transient;
    /// everything else surfaces on the first occurrence.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HuginnError::QuotaExceeded { .. } | HuginnError::ProviderUnreachable(_)
        )
    }

    /// Provider-supplied retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            HuginnError::QuotaExceeded { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// HTTP-like status associated with this variant, for monitor logs.
    pub fn status(&self) -> Option<u16> {
        match self {
            HuginnError::QuotaExceeded { .. } => Some(429),
            HuginnError::AuthenticationFailed => Some(401),
            HuginnError::InvalidRequest(_) => Some(400),
            _ => None,
        }
    }

    /// Whether this error counts against the monitor's quota-error counter.
    pub fn is_quota(&self) -> bool {
        matches!(self, HuginnError::QuotaExceeded { .. })
    }

    /// Classify a provider failure into the error taxonomy.
    ///
    /// `status` is the HTTP status when one was received; `message` is the
    /// provider's error text. Classification priority: rate-limit/quota,
    /// then auth, then malformed request, then transport, then catch-all.
    /// This is the only place where string matching on provider signals
    /// is permitted.
    pub fn classify(status: Option<u16>, message: &str) -> HuginnError {
        let lower = message.to_lowercase();
        if status == Some(429)
            || lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("quota")
        {
            HuginnError::QuotaExceeded { retry_after: None }
        } else if status == Some(401)
            || status == Some(403)
            || lower.contains("unauthorized")
            || lower.contains("invalid api key")
            || lower.contains("authentication")
        {
            HuginnError::AuthenticationFailed
        } else if status == Some(400) || lower.contains("invalid request") {
            HuginnError::InvalidRequest(message.to_string())
        } else if lower.contains("connection reset")
            || lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("unreachable")
            || lower.contains("connection refused")
        {
            HuginnError::ProviderUnreachable(message.to_string())
        } else {
            HuginnError::Provider(message.to_string())
        }
    }
}

impl From<reqwest::Error> for HuginnError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            HuginnError::ProviderUnreachable(err.to_string())
        } else {
            HuginnError::Http(err.to_string())
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
