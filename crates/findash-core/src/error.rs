use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and contract errors exposed by `findash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error(
        "invalid statement type '{value}', expected one of income, balance-sheet, cash-flow, profile"
    )]
    InvalidStatementType { value: String },

    #[error("fiscal period must be a YYYY-MM-DD date: '{value}'")]
    InvalidPeriod { value: String },
}

/// Fetch-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Network/HTTP failure or 5xx; eligible for one bounded retry.
    RemoteUnavailable,
    /// Provider quota exhausted; never retried, throttles the orchestration.
    RateLimited,
    /// The provider does not know the ticker; never retried.
    NotFound,
    /// The provider answered with a body we cannot interpret.
    MalformedPayload,
}

/// Structured fetch error surfaced by statement sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::RemoteUnavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::RateLimited,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::MalformedPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::RemoteUnavailable => "fetch.remote_unavailable",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::NotFound => "fetch.not_found",
            FetchErrorKind::MalformedPayload => "fetch.malformed_payload",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Configuration errors raised when assembling the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing API key: set {var} or pass --api-key")]
    MissingApiKey { var: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_unavailable_is_retryable() {
        assert!(FetchError::remote_unavailable("timeout").retryable());
        assert!(!FetchError::rate_limited("quota").retryable());
        assert!(!FetchError::not_found("unknown ticker").retryable());
        assert!(!FetchError::malformed_payload("not json").retryable());
    }

    #[test]
    fn codes_follow_the_fetch_namespace() {
        assert_eq!(
            FetchError::rate_limited("quota").code(),
            "fetch.rate_limited"
        );
        assert_eq!(FetchError::not_found("nope").code(), "fetch.not_found");
    }
}
