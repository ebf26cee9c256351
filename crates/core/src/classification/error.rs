//! Classification error types.

use thiserror::Error;

use conciliar_shared::AppError;

use super::ai::AiError;
use crate::account::AccountError;

/// Errors that can occur while classifying a transaction.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// A credit that is not income was assigned to a revenue account.
    #[error("Credit cannot be classified as revenue: {reason}")]
    NotRevenue {
        /// Keyword that identified the movement.
        reason: String,
    },

    /// A generic account was chosen without a sufficient justification.
    #[error("Account {code} is generic and needs a justification of at least {min_len} characters")]
    JustificationRequired {
        /// The generic account code.
        code: String,
        /// Minimum justification length.
        min_len: usize,
    },

    /// The chosen account cannot receive postings.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The AI service failed.
    #[error(transparent)]
    Ai(#[from] AiError),
}

impl ClassificationError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotRevenue { .. } => "NOT_REVENUE",
            Self::JustificationRequired { .. } => "JUSTIFICATION_REQUIRED",
            Self::Account(err) => err.error_code(),
            Self::Ai(err) => err.error_code(),
        }
    }
}

impl From<ClassificationError> for AppError {
    fn from(err: ClassificationError) -> Self {
        match err {
            ClassificationError::Account(err) => err.into(),
            ClassificationError::Ai(err) => err.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}
