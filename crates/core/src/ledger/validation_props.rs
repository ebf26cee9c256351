//! Property-based tests for ledger line validation.

use proptest::prelude::*;

use conciliar_shared::types::{AccountId, Amount};

use super::entry::{EntryType, LedgerLine};
use super::error::LedgerError;
use super::validation::validate_lines;

fn make_line(entry_type: EntryType, amount: i64) -> LedgerLine {
    LedgerLine {
        account_id: AccountId::new(),
        account_code: "4.1.1.01".into(),
        entry_type,
        amount: Amount::from_minor(amount),
        memo: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Zero or negative lines are rejected wherever they appear.
    #[test]
    fn prop_non_positive_rejected(amount in -1_000_000i64..=0, other in 1i64..1_000_000) {
        let lines = vec![
            make_line(EntryType::Debit, other),
            make_line(EntryType::Credit, amount),
        ];
        prop_assert_eq!(validate_lines(&lines), Err(LedgerError::InvalidAmount));
    }

    /// Balance is decided by exact equality of the two sides.
    #[test]
    fn prop_balance_is_exact(debit in 1i64..1_000_000, credit in 1i64..1_000_000) {
        let lines = vec![
            make_line(EntryType::Debit, debit),
            make_line(EntryType::Credit, credit),
        ];
        prop_assert_eq!(validate_lines(&lines).is_ok(), debit == credit);
    }
}
