//! Bank transaction domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{Amount, BankTransactionId, CounterpartId, TenantId};

use crate::import::{MemoInfo, StatementLine};
use crate::workflow::TransactionStatus;

/// Cash direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money in (positive amount).
    Credit,
    /// Money out (negative amount).
    Debit,
}

impl Direction {
    /// Returns the direction of a signed amount. Zero counts as credit.
    #[must_use]
    pub fn of(amount: Amount) -> Self {
        if amount.is_negative() {
            Self::Debit
        } else {
            Self::Credit
        }
    }

    /// Returns the string representation of the direction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

/// A transaction imported from a bank statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier.
    pub id: BankTransactionId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Identifier assigned by the bank (OFX `FITID`).
    pub external_id: String,
    /// Posting date.
    pub date: NaiveDate,
    /// Signed amount: credits positive, debits negative.
    pub amount: Amount,
    /// Human readable description.
    pub description: String,
    /// Raw memo as found in the statement.
    pub memo: Option<String>,
    /// Extracted settlement reference (`COB000123`).
    pub reference: Option<String>,
    /// Counterpart record paired by the matcher.
    pub counterpart_id: Option<CounterpartId>,
    /// Workflow status.
    pub status: TransactionStatus,
    /// When the transaction was imported.
    pub imported_at: DateTime<Utc>,
}

impl BankTransaction {
    /// Builds an `imported` transaction from a parsed statement line.
    #[must_use]
    pub fn from_statement_line(tenant_id: TenantId, line: &StatementLine) -> Self {
        let reference = line
            .memo
            .as_deref()
            .or(line.name.as_deref())
            .and_then(|memo| MemoInfo::classify(memo).reference);
        Self {
            id: BankTransactionId::new(),
            tenant_id,
            external_id: line.fitid.clone(),
            date: line.date,
            amount: line.amount,
            description: line.description.clone(),
            memo: line.memo.clone(),
            reference,
            counterpart_id: None,
            status: TransactionStatus::Imported,
            imported_at: Utc::now(),
        }
    }

    /// Returns the cash direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::of(self.amount)
    }

    /// Returns the memo classification of this transaction.
    #[must_use]
    pub fn memo_info(&self) -> MemoInfo {
        MemoInfo::classify(self.memo.as_deref().unwrap_or(&self.description))
    }
}
