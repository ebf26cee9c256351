//! Approval gate: the only way out of `pending`.
//!
//! Only designated reviewers may decide. Every decision is returned as an
//! immutable `ApprovalDecision` for the append-only history.

use chrono::Utc;

use conciliar_shared::types::{DecisionId, TenantId, UserId};

use crate::workflow::decision::{ApprovalDecision, DecisionSubject};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Decision, ProposalStatus};

/// Reviewer authorization and decision rules.
#[derive(Debug, Clone)]
pub struct ApprovalGate {
    reviewers: Vec<UserId>,
    min_comment_len: usize,
}

impl ApprovalGate {
    /// Creates a gate for the given reviewers.
    #[must_use]
    pub fn new(reviewers: Vec<UserId>, min_comment_len: usize) -> Self {
        Self {
            reviewers,
            min_comment_len,
        }
    }

    /// Returns true if the user may decide proposals.
    #[must_use]
    pub fn is_reviewer(&self, user: UserId) -> bool {
        self.reviewers.contains(&user)
    }

    /// Fails unless the user is a designated reviewer.
    ///
    /// # Errors
    ///
    /// `NotAReviewer` otherwise.
    pub fn authorize(&self, user: UserId) -> Result<(), WorkflowError> {
        if self.is_reviewer(user) {
            Ok(())
        } else {
            Err(WorkflowError::NotAReviewer { user_id: user })
        }
    }

    /// Decides a pending subject.
    ///
    /// Authors may decide their own proposals when they are reviewers.
    ///
    /// # Errors
    ///
    /// - `NotAReviewer` if the reviewer is not designated; checked first
    /// - `InvalidProposalTransition` if the subject is no longer pending
    /// - `CommentRequired` if a rejection comment is shorter than the minimum
    pub fn decide(
        &self,
        tenant_id: TenantId,
        subject: DecisionSubject,
        current: ProposalStatus,
        reviewer: UserId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<ApprovalDecision, WorkflowError> {
        self.authorize(reviewer)?;

        if current != ProposalStatus::Pending {
            return Err(WorkflowError::InvalidProposalTransition {
                from: current,
                to: decision.resulting_status(),
            });
        }

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if decision == Decision::Reject
            && comment
                .as_ref()
                .is_none_or(|c| c.chars().count() < self.min_comment_len)
        {
            return Err(WorkflowError::CommentRequired {
                min_len: self.min_comment_len,
            });
        }

        Ok(ApprovalDecision {
            id: DecisionId::new(),
            tenant_id,
            subject,
            reviewer,
            decision,
            decided_at: Utc::now(),
            comment,
        })
    }
}
