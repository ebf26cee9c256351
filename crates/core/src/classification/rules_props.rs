//! Property-based tests for rule learning and promotion.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

use conciliar_shared::types::{AccountId, Amount, BankTransactionId, TenantId};

use crate::classification::rules::{ClassificationRule, RuleStatus};
use crate::transaction::BankTransaction;
use crate::workflow::TransactionStatus;

fn rule() -> ClassificationRule {
    let tx = BankTransaction {
        id: BankTransactionId::new(),
        tenant_id: TenantId::new(),
        external_id: "F1".into(),
        date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        amount: Amount::from_minor(-10_000),
        description: "PAGAMENTO FORNECEDOR ALPHA SERVICOS".into(),
        memo: None,
        reference: None,
        counterpart_id: None,
        status: TransactionStatus::Imported,
        imported_at: Utc::now(),
    };
    ClassificationRule::learn(&tx, AccountId::new(), "Fornecedores", None)
        .expect("description has keywords")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Counters always add up and disabled rules never come back.
    #[test]
    fn prop_counters_consistent_and_disable_sticky(
        outcomes in prop::collection::vec(any::<bool>(), 0..40)
    ) {
        let mut rule = rule();
        let mut was_disabled = false;
        for approved in outcomes {
            rule.record_outcome(approved);
            prop_assert_eq!(rule.times_applied, rule.times_approved + rule.times_rejected);
            if was_disabled {
                prop_assert_eq!(rule.status, RuleStatus::Disabled);
            }
            was_disabled = rule.status == RuleStatus::Disabled;
        }
    }

    /// A rule approved every time ends up auto after ten approvals.
    #[test]
    fn prop_unanimous_approvals_promote(count in 0u32..25) {
        let mut rule = rule();
        for _ in 0..count {
            rule.record_outcome(true);
        }
        let expected = match count {
            0..=2 => RuleStatus::Learning,
            3..=9 => RuleStatus::SemiAuto,
            _ => RuleStatus::Auto,
        };
        prop_assert_eq!(rule.status, expected);
    }

    /// Auto status implies the approval thresholds hold.
    #[test]
    fn prop_auto_implies_thresholds(
        outcomes in prop::collection::vec(prop::bool::weighted(0.9), 0..60)
    ) {
        let mut rule = rule();
        for approved in outcomes {
            rule.record_outcome(approved);
        }
        if rule.status == RuleStatus::Auto {
            prop_assert!(rule.times_approved >= 10);
            prop_assert!(rule.times_approved * 100 >= rule.times_applied * 95);
        }
    }
}
