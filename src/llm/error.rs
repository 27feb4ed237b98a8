//! Chat-completions failures and the retry policy applied to them.

use std::fmt;
use std::time::Duration;

/// What went wrong with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// 429
    RateLimited,
    /// 5xx, or a status outside the 4xx range
    ServerError,
    /// Any other 4xx: bad request, bad key, unknown model
    ClientError,
    /// No status at all: connect failure, timeout, reset
    NetworkError,
    /// A 2xx whose body is not a chat completion
    ParseError,
}

impl LlmErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }

    /// Whether another attempt can succeed without changing the request.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError | Self::NetworkError)
    }
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimited => "Rate limited",
            Self::ServerError => "Server error",
            Self::ClientError => "Client error",
            Self::NetworkError => "Network error",
            Self::ParseError => "Parse error",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
    /// `Retry-After` sent with the failed response, on any status
    pub retry_after: Option<Duration>,
}

impl LlmError {
    /// Error for a non-success HTTP response.
    pub fn from_status(status: u16, body: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            kind: LlmErrorKind::from_status(status),
            status_code: Some(status),
            message: body.into(),
            retry_after,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::without_status(LlmErrorKind::NetworkError, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::without_status(LlmErrorKind::ParseError, message)
    }

    fn without_status(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
            retry_after: None,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// How often and how long to retry retryable failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Wall-clock ceiling across all attempts, waits included
    pub max_retry_duration: Duration,
    /// First backoff step when the server gives no `Retry-After`
    pub base_delay: Duration,
    /// Cap on a single backoff step
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(120),
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether `error`, seen on attempt `attempt` (0-based), earns another try.
    pub fn allows(&self, error: &LlmError, attempt: u32) -> bool {
        error.kind.is_retryable() && attempt < self.max_retries
    }

    /// Wait before the next attempt. `Retry-After` wins, including zero;
    /// otherwise `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, error: &LlmError, attempt: u32) -> Duration {
        if let Some(retry_after) = error.retry_after {
            return retry_after;
        }
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}
