//! Account error types.

use thiserror::Error;

use conciliar_shared::AppError;
use conciliar_shared::types::AccountId;

/// Errors raised when an account reference is validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Account not found by id.
    #[error("Account {0} not found")]
    NotFound(AccountId),

    /// Account not found by code.
    #[error("Account with code {0} not found")]
    CodeNotFound(String),

    /// Account is inactive and cannot be assigned.
    #[error("Account {code} is inactive")]
    Inactive {
        /// The account code.
        code: String,
    },

    /// Account is synthetic and cannot be assigned.
    #[error("Account {code} is synthetic and does not accept postings")]
    Synthetic {
        /// The account code.
        code: String,
    },

    /// Code does not follow the `X.X.X.XX` hierarchy.
    #[error("Invalid account code: {0}")]
    InvalidCode(String),

    /// Code is already used by another account.
    #[error("Account code {0} already exists")]
    DuplicateCode(String),
}

impl AccountError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::CodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Inactive { .. } => "ACCOUNT_INACTIVE",
            Self::Synthetic { .. } => "ACCOUNT_SYNTHETIC",
            Self::InvalidCode(_) => "INVALID_ACCOUNT_CODE",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) | AccountError::CodeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}
