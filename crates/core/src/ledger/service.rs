//! Ledger writer: turns an approved proposal into a balanced entry.
//!
//! Bank movements are posted against transit accounts so that the bank
//! account itself is only touched by the statement import:
//! - credit transaction: debit the credit transit account, credit each
//!   proposal line account
//! - debit transaction: debit each proposal line account, credit the debit
//!   transit account

use chrono::Utc;

use conciliar_shared::types::{LedgerEntryId, UserId};

use super::entry::{EntryType, LedgerEntry, LedgerLine};
use super::error::LedgerError;
use super::validation::validate_lines;
use crate::account::ChartOfAccounts;
use crate::transaction::{BankTransaction, Direction};
use crate::workflow::{ClassificationProposal, ProposalStatus};

/// Codes of the transit accounts used for bank movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitAccounts {
    /// Debited when money comes in.
    pub credit: String,
    /// Credited when money goes out.
    pub debit: String,
}

/// Stateless service for building ledger entries.
pub struct LedgerService;

impl LedgerService {
    /// Builds the ledger entry of an approved proposal.
    ///
    /// # Errors
    ///
    /// - `ProposalNotApproved` unless the proposal is approved
    /// - `TransactionMismatch` if the proposal belongs to another transaction
    /// - `Account` if a line or transit account is unknown, inactive or synthetic
    /// - validation errors if the resulting lines do not balance
    pub fn build_entry(
        transaction: &BankTransaction,
        proposal: &ClassificationProposal,
        chart: &ChartOfAccounts,
        transit: &TransitAccounts,
        approved_by: UserId,
    ) -> Result<LedgerEntry, LedgerError> {
        if proposal.status != ProposalStatus::Approved {
            return Err(LedgerError::ProposalNotApproved(proposal.status));
        }
        if proposal.transaction_id != transaction.id {
            return Err(LedgerError::TransactionMismatch);
        }

        let (transit_code, transit_side, line_side) = match transaction.direction() {
            Direction::Credit => (&transit.credit, EntryType::Debit, EntryType::Credit),
            Direction::Debit => (&transit.debit, EntryType::Credit, EntryType::Debit),
        };
        let transit_account = chart.require_assignable_code(transit_code)?;

        let mut lines = Vec::with_capacity(proposal.lines.len() + 1);
        lines.push(LedgerLine {
            account_id: transit_account.id,
            account_code: transit_account.code.clone(),
            entry_type: transit_side,
            amount: transaction.amount.abs(),
            memo: None,
        });
        for proposed in &proposal.lines {
            let account = chart.require_assignable(proposed.account_id)?;
            lines.push(LedgerLine {
                account_id: account.id,
                account_code: account.code.clone(),
                entry_type: line_side,
                amount: proposed.amount.abs(),
                memo: proposed.memo.clone(),
            });
        }

        validate_lines(&lines)?;

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            tenant_id: transaction.tenant_id,
            transaction_id: transaction.id,
            proposal_id: proposal.id,
            date: transaction.date,
            description: transaction.description.clone(),
            lines,
            approved_by,
            created_at: Utc::now(),
        })
    }
}
