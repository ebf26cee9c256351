//! Application-wide error types.
//!
//! Every module error in the workspace maps into one of these kinds so that
//! callers can decide uniformly between local recovery (validation), retry
//! (some external failures) and surfacing (authorization, quota).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Subdivision of external service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalServiceKind {
    /// The remote service throttled the request.
    RateLimited,
    /// The account behind the remote service has no quota left.
    QuotaExceeded,
    /// Timeouts, 5xx responses and other transport failures.
    Transient,
}

impl ExternalServiceKind {
    /// Returns true if a bounded retry with backoff is appropriate.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient)
    }

    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Transient => "transient",
        }
    }
}

impl std::fmt::Display for ExternalServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected by a business rule (split sum, inactive account, missing field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced transaction, account or proposal does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The actor is not allowed to perform the operation.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// AI or persistence transport failure.
    #[error("External service error ({kind}): {message}")]
    ExternalService {
        /// The failure subdivision.
        kind: ExternalServiceKind,
        /// Human readable detail.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Authorization(_) => "AUTHORIZATION_ERROR",
            Self::ExternalService { kind, .. } => match kind {
                ExternalServiceKind::RateLimited => "EXTERNAL_RATE_LIMITED",
                ExternalServiceKind::QuotaExceeded => "EXTERNAL_QUOTA_EXCEEDED",
                ExternalServiceKind::Transient => "EXTERNAL_TRANSIENT",
            },
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the failed operation may be retried automatically.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ExternalService { kind, .. } => kind.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if the error must be shown to the user as blocking.
    ///
    /// Quota exhaustion needs manual remediation; authorization failures are
    /// never downgraded.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::Authorization(_)
                | Self::ExternalService {
                    kind: ExternalServiceKind::QuotaExceeded,
                    ..
                }
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
