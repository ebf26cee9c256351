//! Ledger error types.

use thiserror::Error;

use conciliar_shared::AppError;
use conciliar_shared::types::Amount;

use crate::account::AccountError;
use crate::workflow::ProposalStatus;

/// Errors that can occur while building a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Only approved proposals reach the ledger.
    #[error("Proposal is {0}; only approved proposals can be posted")]
    ProposalNotApproved(ProposalStatus),

    /// The proposal belongs to another transaction.
    #[error("Proposal does not belong to the transaction")]
    TransactionMismatch,

    /// Entry has no lines.
    #[error("Entry must have at least one line")]
    NoLines,

    /// Entry has only debits or only credits.
    #[error("Entry must have both debit and credit lines")]
    SingleSided,

    /// A line amount is zero or negative.
    #[error("Line amount must be positive")]
    InvalidAmount,

    /// Debits and credits differ.
    #[error("Entry is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced {
        /// Total debit amount.
        debits: Amount,
        /// Total credit amount.
        credits: Amount,
    },

    /// A line or transit account cannot receive postings.
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl LedgerError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProposalNotApproved(_) => "PROPOSAL_NOT_APPROVED",
            Self::TransactionMismatch => "TRANSACTION_MISMATCH",
            Self::NoLines => "NO_LINES",
            Self::SingleSided => "SINGLE_SIDED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::Account(err) => err.error_code(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Account(err) => err.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}
