//! Split error types.

use thiserror::Error;

use conciliar_shared::AppError;
use conciliar_shared::types::Amount;

use crate::account::AccountError;

/// Errors raised when a split is validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// No lines were given.
    #[error("A split needs at least one line")]
    Empty,

    /// A line has a zero amount.
    #[error("Line {position} has a zero amount")]
    ZeroLine {
        /// Line position, starting at 1.
        position: usize,
    },

    /// A line has the opposite sign of the transaction.
    #[error("Line {position} amount {amount} does not have the sign of the transaction")]
    SignMismatch {
        /// Line position, starting at 1.
        position: usize,
        /// Offending amount.
        amount: Amount,
    },

    /// The lines do not add up to the transaction amount.
    #[error("Split lines add up to {actual} but the transaction amount is {expected} (difference {difference})")]
    SumMismatch {
        /// Transaction amount.
        expected: Amount,
        /// Sum of the lines.
        actual: Amount,
        /// `expected - actual`.
        difference: Amount,
    },

    /// The line amounts overflow.
    #[error("Split line amounts overflow")]
    Overflow,

    /// A line account cannot receive postings.
    #[error("Line {position}: {source}")]
    Account {
        /// Line position, starting at 1.
        position: usize,
        /// The account failure.
        source: AccountError,
    },

    /// The justification is missing or too short.
    #[error("A justification of at least {min_len} characters is required")]
    JustificationTooShort {
        /// Minimum justification length.
        min_len: usize,
    },
}

impl SplitError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "SPLIT_EMPTY",
            Self::ZeroLine { .. } => "SPLIT_ZERO_LINE",
            Self::SignMismatch { .. } => "SPLIT_SIGN_MISMATCH",
            Self::SumMismatch { .. } => "SPLIT_SUM_MISMATCH",
            Self::Overflow => "SPLIT_OVERFLOW",
            Self::Account { source, .. } => source.error_code(),
            Self::JustificationTooShort { .. } => "JUSTIFICATION_TOO_SHORT",
        }
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        Self::Validation(err.to_string())
    }
}
