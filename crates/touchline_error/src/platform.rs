//! Social platform error types.

/// Social platform error conditions.
///
/// The dispatcher branches on these kinds: duplicates and conversation-control
/// denials mark the source item as handled, quota exhaustion triggers a long
/// cooldown, rate limits pause the loop, everything else is logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// The platform rejected the post as duplicate content
    #[display("Duplicate content: {}", _0)]
    Duplicate(String),
    /// Reply not permitted (conversation controls, blocked, protected)
    #[display("Permission denied: {}", _0)]
    Forbidden(String),
    /// Credits or paid quota exhausted (HTTP 402 or usage-cap responses)
    #[display("Quota exhausted: {}", _0)]
    QuotaExhausted(String),
    /// HTTP 429; retry after the given number of seconds when known
    #[display("Rate limited (retry after {:?}s)", retry_after_secs)]
    RateLimited {
        /// Seconds until the platform window resets
        retry_after_secs: Option<u64>,
    },
    /// Credentials rejected
    #[display("Unauthorized: {}", _0)]
    Unauthorized(String),
    /// Unknown user handle
    #[display("User not found: {}", _0)]
    UserNotFound(String),
    /// Network failure, timeout, or 5xx
    #[display("Transient platform failure: {}", _0)]
    Transient(String),
    /// Any other client error the platform returned
    #[display("Request rejected (HTTP {}): {}", status, message)]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// Response body did not match the expected shape
    #[display("Malformed response: {}", _0)]
    MalformedResponse(String),
}

impl PlatformErrorKind {
    /// Check if this error should be retried by the HTTP layer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Check if the source item should be marked as handled despite the failure.
    pub fn marks_handled(&self) -> bool {
        matches!(self, Self::Duplicate(_) | Self::Forbidden(_))
    }
}

/// Platform error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    /// The kind of error that occurred
    pub kind: PlatformErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new platform error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PlatformErrorKind {
        &self.kind
    }
}
