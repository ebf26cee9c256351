//! Workflow error types for the reconciliation lifecycle.

use rust_decimal::Decimal;
use thiserror::Error;

use conciliar_shared::AppError;
use conciliar_shared::types::{AccountRequestId, BankTransactionId, ProposalId, UserId};

use crate::workflow::types::{ProposalStatus, TransactionStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Attempted an invalid transaction status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: TransactionStatus,
        /// The attempted target status.
        to: TransactionStatus,
    },

    /// Attempted to decide a proposal that is no longer pending.
    #[error("Proposal is {from} and cannot become {to}")]
    InvalidProposalTransition {
        /// The current proposal status.
        from: ProposalStatus,
        /// The attempted target status.
        to: ProposalStatus,
    },

    /// The actor is not a designated reviewer.
    #[error("User {user_id} is not a designated reviewer")]
    NotAReviewer {
        /// The user who attempted the decision.
        user_id: UserId,
    },

    /// A rejection comment is missing or too short.
    #[error("A comment of at least {min_len} characters is required")]
    CommentRequired {
        /// Minimum comment length.
        min_len: usize,
    },

    /// A justification is missing or too short.
    #[error("A justification of at least {min_len} characters is required")]
    JustificationRequired {
        /// Minimum justification length.
        min_len: usize,
    },

    /// A proposal confidence outside `[0, 1]`.
    #[error("Confidence {0} is outside the range 0 to 1")]
    ConfidenceOutOfRange(Decimal),

    /// Transaction not found.
    #[error("Transaction {0} not found")]
    TransactionNotFound(BankTransactionId),

    /// Proposal not found.
    #[error("Proposal {0} not found")]
    ProposalNotFound(ProposalId),

    /// Account request not found.
    #[error("Account request {0} not found")]
    AccountRequestNotFound(AccountRequestId),
}

impl WorkflowError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidProposalTransition { .. } => "INVALID_PROPOSAL_TRANSITION",
            Self::NotAReviewer { .. } => "NOT_A_REVIEWER",
            Self::CommentRequired { .. } => "COMMENT_REQUIRED",
            Self::JustificationRequired { .. } => "JUSTIFICATION_REQUIRED",
            Self::ConfidenceOutOfRange(_) => "CONFIDENCE_OUT_OF_RANGE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::ProposalNotFound(_) => "PROPOSAL_NOT_FOUND",
            Self::AccountRequestNotFound(_) => "ACCOUNT_REQUEST_NOT_FOUND",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotAReviewer { .. } => Self::Authorization(err.to_string()),
            WorkflowError::TransactionNotFound(_)
            | WorkflowError::ProposalNotFound(_)
            | WorkflowError::AccountRequestNotFound(_) => Self::NotFound(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_confidence_out_of_range_is_validation() {
        let err = WorkflowError::ConfidenceOutOfRange(dec!(7.5));
        assert_eq!(err.error_code(), "CONFIDENCE_OUT_OF_RANGE");
        assert!(err.to_string().contains("7.5"));
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: TransactionStatus::Approved,
            to: TransactionStatus::PendingApproval,
        };
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("approved"));
        assert!(err.to_string().contains("pending_approval"));
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }

    #[test]
    fn test_not_a_reviewer_is_authorization() {
        let err = WorkflowError::NotAReviewer {
            user_id: UserId::new(),
        };
        assert_eq!(err.error_code(), "NOT_A_REVIEWER");
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Authorization(_)));
        assert!(app.is_blocking());
    }

    #[test]
    fn test_not_found_mapping() {
        let err = WorkflowError::ProposalNotFound(ProposalId::new());
        assert_eq!(err.error_code(), "PROPOSAL_NOT_FOUND");
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[test]
    fn test_decided_proposal_error() {
        let err = WorkflowError::InvalidProposalTransition {
            from: ProposalStatus::Superseded,
            to: ProposalStatus::Approved,
        };
        assert_eq!(
            err.to_string(),
            "Proposal is superseded and cannot become approved"
        );
    }
}
