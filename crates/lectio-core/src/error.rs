//! Error taxonomy for remote source fetches

/// Outcome classification for a single logical fetch.
///
/// `NotFound` is terminal and expected (a chapter or page genuinely absent)
/// so callers can distinguish "does not exist" from transient flakiness.
/// Everything retryable is handled inside the fetcher; what escapes is
/// either `NotFound` or a terminal failure after retry exhaustion.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP 404 — never retried, propagated immediately.
    NotFound { url: String },
    /// Any other non-2xx HTTP response.
    Http { status: u16, message: String },
    /// No response within the configured timeout.
    Timeout { url: String },
    /// Connection-level failure (DNS, reset, TLS) without an HTTP status.
    Transport(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { url } => write!(f, "not found: {url}"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Timeout { url } => write!(f, "timeout: {url}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// 429 and 5xx are retryable; other 4xx are caller mistakes and are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout { .. } | Self::Transport(_) => true,
        }
    }

    /// HTTP 429 — backs off harder than other transient failures.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Http { status: 429, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
