//! Property-based tests for the split engine.

use proptest::prelude::*;

use conciliar_shared::types::{Amount, ProposalId};

use super::engine::SplitEngine;
use super::engine::tests::{JUSTIFICATION, chart, transaction};
use super::error::SplitError;
use crate::workflow::ProposedLine;

fn arb_amounts() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1_000i64..5_000_000, 1..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A split is accepted exactly when its lines add up to the transaction.
    #[test]
    fn prop_sum_must_match_exactly(
        amounts in arb_amounts(),
        offset in -500i64..500,
        debit in any::<bool>(),
    ) {
        let chart = chart();
        let sign = if debit { -1 } else { 1 };
        let account = chart.by_code("4.1.1.02").map(|a| a.id).unwrap_or_default();
        let lines: Vec<ProposedLine> = amounts
            .iter()
            .map(|a| ProposedLine::new(account, Amount::from_minor(a * sign)))
            .collect();
        let total: i64 = amounts.iter().sum::<i64>() * sign;
        let tx = transaction(total + offset * sign);
        prop_assume!(!tx.amount.is_zero());

        let result = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &lines,
            &chart,
            Some(JUSTIFICATION),
            10,
        );
        if offset == 0 {
            let split = result.unwrap_or_default();
            prop_assert_eq!(split.len(), lines.len());
            prop_assert_eq!(split.iter().map(|l| l.amount).sum::<Amount>(), tx.amount);
        } else {
            let is_sum_mismatch = matches!(result, Err(SplitError::SumMismatch { .. }));
            prop_assert!(is_sum_mismatch);
        }
    }
}
