//! Classification proposals awaiting review.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{AccountId, Amount, BankTransactionId, ProposalId, TenantId, UserId};

use crate::classification::SuggestionSource;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ProposalKind, ProposalStatus};

/// Decimal places kept for proposal confidences.
pub const CONFIDENCE_SCALE: u32 = 4;

/// Rounds a confidence to [`CONFIDENCE_SCALE`] places, half away from zero
/// like a Postgres `NUMERIC` column.
fn round_confidence(confidence: Decimal) -> Decimal {
    confidence.round_dp_with_strategy(CONFIDENCE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Checks that a confidence lies in `[0, 1]` and rounds it to
/// [`CONFIDENCE_SCALE`] places.
///
/// # Errors
///
/// Returns `ConfidenceOutOfRange` otherwise.
pub fn checked_confidence(confidence: Decimal) -> Result<Decimal, WorkflowError> {
    if confidence < Decimal::ZERO || confidence > Decimal::ONE {
        return Err(WorkflowError::ConfidenceOutOfRange(confidence));
    }
    Ok(round_confidence(confidence))
}

/// One account and amount of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedLine {
    /// Target account.
    pub account_id: AccountId,
    /// Signed amount, same sign as the transaction.
    pub amount: Amount,
    /// Optional line memo.
    pub memo: Option<String>,
}

impl ProposedLine {
    /// Creates a line without memo.
    #[must_use]
    pub fn new(account_id: AccountId, amount: Amount) -> Self {
        Self {
            account_id,
            amount,
            memo: None,
        }
    }
}

/// A proposed classification of a bank transaction.
///
/// At most one proposal per transaction is `pending`; a new one supersedes
/// it instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationProposal {
    /// Unique identifier.
    pub id: ProposalId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Classified transaction.
    pub transaction_id: BankTransactionId,
    /// Single account or split.
    pub kind: ProposalKind,
    /// Proposed lines; they add up to the transaction amount.
    pub lines: Vec<ProposedLine>,
    /// Confidence, 0 to 1.
    pub confidence: Decimal,
    /// Where the proposal came from.
    pub source: SuggestionSource,
    /// Author justification.
    pub justification: Option<String>,
    /// Review status.
    pub status: ProposalStatus,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// The proposal that replaced this one.
    pub superseded_by: Option<ProposalId>,
}

impl ClassificationProposal {
    /// Creates a pending proposal.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn pending(
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
        kind: ProposalKind,
        lines: Vec<ProposedLine>,
        confidence: Decimal,
        source: SuggestionSource,
        justification: Option<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: ProposalId::new(),
            tenant_id,
            transaction_id,
            kind,
            lines,
            confidence: round_confidence(confidence),
            source,
            justification,
            status: ProposalStatus::Pending,
            created_by,
            created_at: Utc::now(),
            superseded_by: None,
        }
    }

    /// Sum of the proposed lines.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Returns true while the proposal awaits a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    /// The single account of a one-line proposal.
    #[must_use]
    pub fn single_account(&self) -> Option<AccountId> {
        match self.lines.as_slice() {
            [line] => Some(line.account_id),
            _ => None,
        }
    }
}
