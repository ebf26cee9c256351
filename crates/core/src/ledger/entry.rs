//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{
    AccountId, Amount, BankTransactionId, LedgerEntryId, ProposalId, TenantId, UserId,
};

/// Side of a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit line (increases assets/expenses, decreases liabilities/equity/revenue).
    Debit,
    /// Credit line (decreases assets/expenses, increases liabilities/equity/revenue).
    Credit,
}

impl EntryType {
    /// Returns the string representation of the side.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a side from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// A single line of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Account code, kept for reports.
    pub account_code: String,
    /// Whether this is a debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Amount,
    /// Optional description for this line item.
    pub memo: Option<String>,
}

impl LedgerLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Amount {
        match self.entry_type {
            EntryType::Debit => self.amount,
            EntryType::Credit => -self.amount,
        }
    }
}

/// The balanced double entry written for an approved proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Source bank transaction.
    pub transaction_id: BankTransactionId,
    /// Approved proposal the entry was built from.
    pub proposal_id: ProposalId,
    /// Posting date (the bank transaction date).
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Lines; debits equal credits.
    pub lines: Vec<LedgerLine>,
    /// Reviewer who approved the proposal.
    pub approved_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Total of the debit lines.
    #[must_use]
    pub fn total_debits(&self) -> Amount {
        self.side_total(EntryType::Debit)
    }

    /// Total of the credit lines.
    #[must_use]
    pub fn total_credits(&self) -> Amount {
        self.side_total(EntryType::Credit)
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.lines.iter().map(LedgerLine::signed_amount).sum::<Amount>() == Amount::ZERO
    }

    fn side_total(&self, side: EntryType) -> Amount {
        self.lines
            .iter()
            .filter(|l| l.entry_type == side)
            .map(|l| l.amount)
            .sum()
    }
}
