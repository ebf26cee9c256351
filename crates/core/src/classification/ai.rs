//! AI suggestion service boundary.
//!
//! The classifier only depends on [`AiSuggestionService`]; the HTTP adapter
//! lives in its own crate. Failures are typed so the caller can degrade
//! instead of crashing.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use conciliar_shared::types::Amount;
use conciliar_shared::{AppError, ExternalServiceKind};

use crate::account::{Account, AccountType};
use crate::transaction::BankTransaction;

/// An account the AI may choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAccountOption {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
}

impl From<&Account> for AiAccountOption {
    fn from(account: &Account) -> Self {
        Self {
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
        }
    }
}

/// Request sent to the AI service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRequest {
    /// Transaction description.
    pub description: String,
    /// Signed transaction amount.
    pub amount: Amount,
    /// Assignable accounts.
    pub accounts: Vec<AiAccountOption>,
}

impl AiRequest {
    /// Builds a request for a transaction against a list of accounts.
    #[must_use]
    pub fn for_transaction<'a>(
        transaction: &BankTransaction,
        accounts: impl IntoIterator<Item = &'a Account>,
    ) -> Self {
        Self {
            description: transaction.description.clone(),
            amount: transaction.amount,
            accounts: accounts.into_iter().map(AiAccountOption::from).collect(),
        }
    }
}

/// One account suggested by the AI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiCandidate {
    /// Account code as returned by the service.
    pub code: String,
    /// Confidence, 0 to 1.
    pub confidence: Decimal,
}

/// Response of the AI service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSuggestion {
    /// Suggested accounts, best first.
    pub candidates: Vec<AiCandidate>,
    /// Overall confidence, 0 to 1.
    pub confidence: Decimal,
    /// Free text explanation.
    pub rationale: String,
    /// Model that produced the suggestion.
    pub model: String,
}

/// Typed failures of the AI service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// No quota left; not retried.
    #[error("AI quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Throttled by the service.
    #[error("AI rate limited: {0}")]
    RateLimited(String),

    /// Timeout, 5xx or malformed response.
    #[error("AI service unavailable: {0}")]
    Transient(String),
}

impl AiError {
    /// Returns the external service kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ExternalServiceKind {
        match self {
            Self::QuotaExceeded(_) => ExternalServiceKind::QuotaExceeded,
            Self::RateLimited(_) => ExternalServiceKind::RateLimited,
            Self::Transient(_) => ExternalServiceKind::Transient,
        }
    }

    /// Returns true if the request may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Returns the error code for reports and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::QuotaExceeded(_) => "AI_QUOTA_EXCEEDED",
            Self::RateLimited(_) => "AI_RATE_LIMITED",
            Self::Transient(_) => "AI_TRANSIENT",
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        Self::ExternalService {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Suggests accounts for a transaction description.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiSuggestionService: Send + Sync {
    /// Asks the service for account suggestions.
    async fn suggest(&self, request: &AiRequest) -> Result<AiSuggestion, AiError>;
}
