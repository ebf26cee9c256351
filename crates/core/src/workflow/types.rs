//! Workflow domain types for the reconciliation lifecycle.
//!
//! This module defines the statuses a bank transaction and its proposals
//! move through, and the actions produced by valid transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use conciliar_shared::types::{CounterpartId, UserId};

/// Bank transaction status in the reconciliation workflow.
///
/// The valid transitions are:
/// - Imported → Matched (matcher pairs a counterpart)
/// - Imported | Matched → Classified (candidates available)
/// - Imported | Matched | Classified | Rejected → `PendingApproval` (propose)
/// - `PendingApproval` → `PendingApproval` (superseding proposal)
/// - `PendingApproval` → Approved | Rejected (review decision)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Imported from a statement, untouched.
    Imported,
    /// Paired with a counterpart record.
    Matched,
    /// Candidate accounts are available, no proposal yet.
    Classified,
    /// A proposal waits for a reviewer.
    PendingApproval,
    /// The proposal was approved and the ledger written (terminal).
    Approved,
    /// The last proposal was rejected; a new one may be submitted.
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imported => "imported",
            Self::Matched => "matched",
            Self::Classified => "classified",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "imported" => Some(Self::Imported),
            "matched" => Some(Self::Matched),
            "classified" => Some(Self::Classified),
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if a new proposal may be submitted.
    #[must_use]
    pub fn accepts_proposal(&self) -> bool {
        !matches!(self, Self::Approved)
    }

    /// Returns true if nothing can change anymore.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a classification proposal or account request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Waiting for a reviewer.
    Pending,
    /// Approved by a reviewer (terminal).
    Approved,
    /// Rejected by a reviewer (terminal).
    Rejected,
    /// Replaced by a newer proposal before any decision (terminal).
    Superseded,
}

impl ProposalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Superseded => "superseded",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "superseded" => Some(Self::Superseded),
            _ => None,
        }
    }

    /// Returns true once a decision or replacement happened.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a proposal changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    /// Whole amount to one account.
    Classification,
    /// Amount split across several accounts.
    Reclassification,
}

impl ProposalKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Reclassification => "reclassification",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classification" => Some(Self::Classification),
            "reclassification" => Some(Self::Reclassification),
            _ => None,
        }
    }
}

/// A reviewer's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Accept the proposal.
    Approve,
    /// Refuse the proposal.
    Reject,
}

impl Decision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Parses a decision from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    /// Proposal status resulting from this decision.
    #[must_use]
    pub fn resulting_status(&self) -> ProposalStatus {
        match self {
            Self::Approve => ProposalStatus::Approved,
            Self::Reject => ProposalStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow action representing a state transition with audit data.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Pair the transaction with a counterpart.
    Match {
        /// The new status after matching.
        new_status: TransactionStatus,
        /// The paired counterpart.
        counterpart_id: CounterpartId,
    },
    /// Record that candidates are available.
    Classify {
        /// The new status after classification.
        new_status: TransactionStatus,
    },
    /// Submit a proposal for review.
    Propose {
        /// The new status after proposing.
        new_status: TransactionStatus,
        /// The user who proposed.
        proposed_by: UserId,
        /// When the proposal was made.
        proposed_at: DateTime<Utc>,
    },
    /// Approve the pending proposal.
    Approve {
        /// The new status after approval.
        new_status: TransactionStatus,
        /// The reviewer.
        approved_by: UserId,
        /// When it was approved.
        approved_at: DateTime<Utc>,
        /// Optional reviewer notes.
        comment: Option<String>,
    },
    /// Reject the pending proposal.
    Reject {
        /// The new status after rejection.
        new_status: TransactionStatus,
        /// The reviewer.
        rejected_by: UserId,
        /// When it was rejected.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        comment: String,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> TransactionStatus {
        match self {
            Self::Match { new_status, .. }
            | Self::Classify { new_status }
            | Self::Propose { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. } => *new_status,
        }
    }
}
