//! Append-only review decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{AccountRequestId, DecisionId, ProposalId, TenantId, UserId};

use crate::workflow::types::{Decision, ProposalStatus};

/// What a decision was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum DecisionSubject {
    /// A classification proposal.
    Proposal(ProposalId),
    /// A new-account request.
    AccountRequest(AccountRequestId),
}

/// A reviewer's immutable decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Unique identifier.
    pub id: DecisionId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Decided proposal or request.
    pub subject: DecisionSubject,
    /// Reviewer.
    pub reviewer: UserId,
    /// Verdict.
    pub decision: Decision,
    /// When it was decided.
    pub decided_at: DateTime<Utc>,
    /// Reviewer comment; required for rejections.
    pub comment: Option<String>,
}

impl ApprovalDecision {
    /// Status the subject moves to.
    #[must_use]
    pub fn resulting_status(&self) -> ProposalStatus {
        self.decision.resulting_status()
    }
}
