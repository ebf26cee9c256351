//! Workflow service for bank transaction state transitions.
//!
//! This module implements the state machine that moves a transaction from
//! import to approval. Every method validates the current status and
//! returns the resulting `WorkflowAction`.

use chrono::Utc;

use conciliar_shared::types::{CounterpartId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{TransactionStatus, WorkflowAction};

/// Stateless service for managing transaction workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Pair an imported transaction with a counterpart.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the transaction is `imported`.
    pub fn mark_matched(
        current_status: TransactionStatus,
        counterpart_id: CounterpartId,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current_status, TransactionStatus::Matched)?;
        Ok(WorkflowAction::Match {
            new_status: TransactionStatus::Matched,
            counterpart_id,
        })
    }

    /// Record that candidate accounts are available.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the transaction is `imported` or `matched`.
    pub fn mark_classified(
        current_status: TransactionStatus,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current_status, TransactionStatus::Classified)?;
        Ok(WorkflowAction::Classify {
            new_status: TransactionStatus::Classified,
        })
    }

    /// Submit a proposal for review.
    ///
    /// Allowed from every non-terminal status, including `pending_approval`
    /// where the new proposal supersedes the pending one.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the transaction is already approved.
    pub fn propose(
        current_status: TransactionStatus,
        proposed_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current_status, TransactionStatus::PendingApproval)?;
        Ok(WorkflowAction::Propose {
            new_status: TransactionStatus::PendingApproval,
            proposed_by,
            proposed_at: Utc::now(),
        })
    }

    /// Approve the pending proposal of a transaction.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the transaction is `pending_approval`.
    pub fn approve(
        current_status: TransactionStatus,
        approved_by: UserId,
        comment: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current_status, TransactionStatus::Approved)?;
        Ok(WorkflowAction::Approve {
            new_status: TransactionStatus::Approved,
            approved_by,
            approved_at: Utc::now(),
            comment,
        })
    }

    /// Reject the pending proposal of a transaction.
    ///
    /// # Errors
    ///
    /// - `CommentRequired` if the comment is blank
    /// - `InvalidTransition` unless the transaction is `pending_approval`
    pub fn reject(
        current_status: TransactionStatus,
        rejected_by: UserId,
        comment: String,
    ) -> Result<WorkflowAction, WorkflowError> {
        if comment.trim().is_empty() {
            return Err(WorkflowError::CommentRequired { min_len: 1 });
        }
        Self::guard(current_status, TransactionStatus::Rejected)?;
        Ok(WorkflowAction::Reject {
            new_status: TransactionStatus::Rejected,
            rejected_by,
            rejected_at: Utc::now(),
            comment,
        })
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        use TransactionStatus::{Approved, Classified, Imported, Matched, PendingApproval, Rejected};
        matches!(
            (from, to),
            (Imported, Matched)
                | (Imported | Matched, Classified)
                | (
                    Imported | Matched | Classified | Rejected | PendingApproval,
                    PendingApproval
                )
                | (PendingApproval, Approved | Rejected)
        )
    }

    fn guard(from: TransactionStatus, to: TransactionStatus) -> Result<(), WorkflowError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_from_imported() {
        let action =
            WorkflowService::mark_matched(TransactionStatus::Imported, CounterpartId::new())
                .unwrap();
        assert_eq!(action.new_status(), TransactionStatus::Matched);
    }

    #[test]
    fn test_match_twice_fails() {
        let result =
            WorkflowService::mark_matched(TransactionStatus::Matched, CounterpartId::new());
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_classify_from_matched() {
        let action = WorkflowService::mark_classified(TransactionStatus::Matched).unwrap();
        assert_eq!(action.new_status(), TransactionStatus::Classified);
    }

    #[test]
    fn test_classify_after_proposal_fails() {
        assert!(WorkflowService::mark_classified(TransactionStatus::PendingApproval).is_err());
    }

    #[test]
    fn test_propose_after_rejection() {
        let user = UserId::new();
        let action = WorkflowService::propose(TransactionStatus::Rejected, user).unwrap();
        assert_eq!(action.new_status(), TransactionStatus::PendingApproval);
        if let WorkflowAction::Propose { proposed_by, .. } = action {
            assert_eq!(proposed_by, user);
        } else {
            panic!("Expected Propose action");
        }
    }

    #[test]
    fn test_propose_supersedes_pending() {
        assert!(WorkflowService::propose(TransactionStatus::PendingApproval, UserId::new()).is_ok());
    }

    #[test]
    fn test_propose_after_approval_fails() {
        let result = WorkflowService::propose(TransactionStatus::Approved, UserId::new());
        assert_eq!(
            result.unwrap_err(),
            WorkflowError::InvalidTransition {
                from: TransactionStatus::Approved,
                to: TransactionStatus::PendingApproval,
            }
        );
    }

    #[test]
    fn test_approve_only_from_pending() {
        assert!(WorkflowService::approve(TransactionStatus::PendingApproval, UserId::new(), None).is_ok());
        assert!(WorkflowService::approve(TransactionStatus::Classified, UserId::new(), None).is_err());
    }

    #[test]
    fn test_reject_blank_comment_fails() {
        let result = WorkflowService::reject(
            TransactionStatus::PendingApproval,
            UserId::new(),
            "   ".to_string(),
        );
        assert!(matches!(result, Err(WorkflowError::CommentRequired { .. })));
    }

    #[test]
    fn test_reject_from_pending() {
        let action = WorkflowService::reject(
            TransactionStatus::PendingApproval,
            UserId::new(),
            "Conta errada".to_string(),
        )
        .unwrap();
        assert_eq!(action.new_status(), TransactionStatus::Rejected);
    }
}
