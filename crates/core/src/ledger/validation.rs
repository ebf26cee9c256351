//! Business rule validation for ledger entries.

use conciliar_shared::types::Amount;

use super::entry::{EntryType, LedgerLine};
use super::error::LedgerError;

/// Validates that a set of ledger lines is balanced.
///
/// # Errors
///
/// Returns an error if the lines are not balanced or violate business rules.
pub fn validate_lines(lines: &[LedgerLine]) -> Result<(), LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::NoLines);
    }

    let mut total_debits = Amount::ZERO;
    let mut total_credits = Amount::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for line in lines {
        if !line.amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }

        match line.entry_type {
            EntryType::Debit => {
                total_debits += line.amount;
                has_debit = true;
            }
            EntryType::Credit => {
                total_credits += line.amount;
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSided);
    }

    if total_debits != total_credits {
        return Err(LedgerError::Unbalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(())
}
