//! Inputs and results of workflow operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::AccountId;

use crate::account::AccountRequest;
use crate::classification::{Candidate, ClassificationOutcome, SuggestionSource};
use crate::ledger::LedgerEntry;
use crate::split::SplitLine;
use crate::transaction::BankTransaction;
use crate::workflow::{ApprovalDecision, ClassificationProposal};

/// Result of importing a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Bank name of the statement.
    pub bank_name: String,
    /// Account number of the statement.
    pub account_number: String,
    /// Transactions found in the file.
    pub parsed: usize,
    /// Transactions stored; repeated external ids are skipped.
    pub inserted: Vec<BankTransaction>,
}

impl ImportSummary {
    /// Number of transactions already known.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.parsed - self.inserted.len()
    }
}

/// A single-account proposal to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    /// Target account.
    pub account_id: AccountId,
    /// Author justification; required for generic accounts.
    pub justification: Option<String>,
    /// Where the choice came from.
    pub source: SuggestionSource,
    /// Confidence of the choice.
    pub confidence: Decimal,
}

impl ProposalRequest {
    /// A choice made by a person.
    #[must_use]
    pub fn manual(account_id: AccountId, justification: Option<String>) -> Self {
        Self {
            account_id,
            justification,
            source: SuggestionSource::Manual,
            confidence: Decimal::ONE,
        }
    }

    /// Accepts a classifier candidate as is.
    #[must_use]
    pub fn from_candidate(candidate: &Candidate, justification: Option<String>) -> Self {
        Self {
            account_id: candidate.account_id,
            justification,
            source: candidate.source.clone(),
            confidence: candidate.confidence,
        }
    }
}

/// A stored proposal and the warnings it was accepted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalReceipt {
    /// The new pending proposal.
    pub proposal: ClassificationProposal,
    /// Split lines recorded with it; empty for single-account proposals.
    pub split: Vec<SplitLine>,
    /// Non-blocking guard warnings.
    pub warnings: Vec<String>,
}

/// Result of classifying one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyResult {
    /// Ranked candidates, escalation and degradation flags.
    pub outcome: ClassificationOutcome,
    /// Proposal created automatically from a trusted rule.
    pub proposal: Option<ClassificationProposal>,
}

/// Result of an approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalReceipt {
    /// The recorded decision.
    pub decision: ApprovalDecision,
    /// The entry written to the ledger.
    pub ledger_entry: LedgerEntry,
}

/// A pending proposal with what a reviewer needs to decide it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingProposal {
    /// The classified transaction.
    pub transaction: BankTransaction,
    /// The proposal.
    pub proposal: ClassificationProposal,
    /// Its split lines, if any.
    pub split: Vec<SplitLine>,
}

/// Everything awaiting a reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQueue {
    /// Pending proposals, oldest first.
    pub proposals: Vec<PendingProposal>,
    /// Pending new-account requests, oldest first.
    pub account_requests: Vec<AccountRequest>,
}

impl PendingQueue {
    /// Returns true if nothing awaits review.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty() && self.account_requests.is_empty()
    }
}

/// A proposal and the decisions taken on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalHistory {
    /// The proposal with its current status.
    pub proposal: ClassificationProposal,
    /// Decisions in the order they were recorded.
    pub decisions: Vec<ApprovalDecision>,
}

/// Full review trail of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionHistory {
    /// The transaction with its current status.
    pub transaction: BankTransaction,
    /// Every proposal, oldest first.
    pub proposals: Vec<ProposalHistory>,
    /// Ledger entries written for it.
    pub ledger_entries: Vec<LedgerEntry>,
}
