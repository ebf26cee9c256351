//! Property-based tests for `LedgerService`.

use proptest::prelude::*;

use conciliar_shared::types::{Amount, UserId};

use super::service::LedgerService;
use super::service::tests::{approved, chart, transaction, transit};
use crate::workflow::ProposedLine;

/// Strategy for non-empty lists of positive line amounts in cents.
fn line_amounts() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..10_000_000, 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any approved split whose lines add up produces a balanced entry.
    #[test]
    fn prop_entries_balance(amounts in line_amounts(), credit in any::<bool>()) {
        let chart = chart();
        let sign = if credit { 1 } else { -1 };
        let total: i64 = amounts.iter().sum();
        let tx = transaction(total * sign);
        let account_code = if credit { "3.1.1.01" } else { "4.1.1.01" };
        let account_id = chart.by_code(account_code).map(|a| a.id).unwrap_or_default();
        let lines = amounts
            .iter()
            .map(|a| ProposedLine::new(account_id, Amount::from_minor(a * sign)))
            .collect();
        let proposal = approved(&tx, lines);

        let entry = LedgerService::build_entry(&tx, &proposal, &chart, &transit(), UserId::new());
        prop_assert!(entry.is_ok());
        let entry = entry.unwrap();
        prop_assert!(entry.is_balanced());
        prop_assert_eq!(entry.total_debits(), Amount::from_minor(total));
        prop_assert_eq!(entry.lines.len(), amounts.len() + 1);
    }

    /// Lines that miss the transaction total never reach the ledger.
    #[test]
    fn prop_mismatched_totals_rejected(amounts in line_amounts(), delta in 1i64..1_000) {
        let chart = chart();
        let total: i64 = amounts.iter().sum();
        let tx = transaction(-(total + delta));
        let account_id = chart.by_code("4.1.1.01").map(|a| a.id).unwrap_or_default();
        let lines = amounts
            .iter()
            .map(|a| ProposedLine::new(account_id, Amount::from_minor(-a)))
            .collect();
        let proposal = approved(&tx, lines);
        prop_assert!(
            LedgerService::build_entry(&tx, &proposal, &chart, &transit(), UserId::new()).is_err()
        );
    }
}
