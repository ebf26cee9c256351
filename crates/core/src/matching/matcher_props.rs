//! Property-based tests for the Matcher.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;

use conciliar_shared::types::{Amount, BankTransactionId, CounterpartId, TenantId};

use crate::matching::matcher::Matcher;
use crate::matching::types::{Counterpart, CounterpartKind};
use crate::transaction::BankTransaction;
use crate::workflow::TransactionStatus;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// (day offset, amount in minor units, reference number)
fn arb_record() -> impl Strategy<Value = (i64, i64, u8)> {
    (0i64..20, 1i64..5, 0u8..4)
}

fn to_transaction((day, amount, reference): (i64, i64, u8)) -> BankTransaction {
    BankTransaction {
        id: BankTransactionId::new(),
        tenant_id: TenantId::new(),
        external_id: format!("F{day}"),
        date: base_date() + Duration::days(day),
        amount: Amount::from_minor(amount * 100),
        description: "LIQ.COBRANCA".to_string(),
        memo: None,
        reference: Some(format!("COB00000{reference}")),
        counterpart_id: None,
        status: TransactionStatus::Imported,
        imported_at: Utc::now(),
    }
}

fn to_counterpart((day, amount, reference): (i64, i64, u8)) -> Counterpart {
    Counterpart {
        id: CounterpartId::new(),
        kind: CounterpartKind::BoletoGroup,
        reference: Some(format!("COB00000{reference}")),
        name: None,
        date: base_date() + Duration::days(day),
        amount: Amount::from_minor(amount * 100),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every transaction is either paired once or reported unmatched, and
    /// every counterpart is used at most once.
    #[test]
    fn prop_pairings_partition_transactions(
        txs in prop::collection::vec(arb_record(), 0..12),
        cps in prop::collection::vec(arb_record(), 0..12),
        window in 0i64..4,
    ) {
        let transactions: Vec<_> = txs.into_iter().map(to_transaction).collect();
        let counterparts: Vec<_> = cps.into_iter().map(to_counterpart).collect();
        let outcome = Matcher::new(window).pair(&transactions, &counterparts);

        prop_assert_eq!(outcome.pairings.len() + outcome.unmatched.len(), transactions.len());

        let mut seen_transactions = HashSet::new();
        let mut seen_counterparts = HashSet::new();
        for pairing in &outcome.pairings {
            prop_assert!(seen_transactions.insert(pairing.transaction_id));
            prop_assert!(seen_counterparts.insert(pairing.counterpart_id));
        }
        for id in &outcome.unmatched {
            prop_assert!(seen_transactions.insert(*id));
        }
    }

    /// Pairings always agree on amount and respect the date window.
    #[test]
    fn prop_pairings_respect_amount_and_window(
        txs in prop::collection::vec(arb_record(), 0..12),
        cps in prop::collection::vec(arb_record(), 0..12),
        window in 0i64..4,
    ) {
        let transactions: Vec<_> = txs.into_iter().map(to_transaction).collect();
        let counterparts: Vec<_> = cps.into_iter().map(to_counterpart).collect();
        let outcome = Matcher::new(window).pair(&transactions, &counterparts);

        for pairing in &outcome.pairings {
            let tx = transactions.iter().find(|t| t.id == pairing.transaction_id).unwrap();
            let cp = counterparts.iter().find(|c| c.id == pairing.counterpart_id).unwrap();
            prop_assert_eq!(tx.amount, cp.amount);
            prop_assert_eq!(tx.reference.clone(), cp.reference.clone());
            prop_assert!((cp.date - tx.date).num_days().abs() <= window);
            prop_assert_eq!(pairing.day_distance, (cp.date - tx.date).num_days().abs());
        }
    }
}
