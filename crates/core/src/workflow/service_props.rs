//! Property-based tests for `WorkflowService`.

use proptest::prelude::*;
use uuid::Uuid;

use conciliar_shared::types::{CounterpartId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::TransactionStatus;

/// Strategy for generating random `TransactionStatus` values.
fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Imported),
        Just(TransactionStatus::Matched),
        Just(TransactionStatus::Classified),
        Just(TransactionStatus::PendingApproval),
        Just(TransactionStatus::Approved),
        Just(TransactionStatus::Rejected),
    ]
}

/// Strategy for generating random user ids.
fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating non-blank comments.
fn arb_comment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ]{0,60}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every operation lands on a status the transition table allows.
    #[test]
    fn prop_actions_follow_transition_table(
        status in arb_status(),
        user in arb_user(),
        comment in arb_comment(),
    ) {
        let actions = [
            WorkflowService::mark_matched(status, CounterpartId::new()),
            WorkflowService::mark_classified(status),
            WorkflowService::propose(status, user),
            WorkflowService::approve(status, user, None),
            WorkflowService::reject(status, user, comment),
        ];
        for result in actions {
            match result {
                Ok(action) => prop_assert!(
                    WorkflowService::is_valid_transition(status, action.new_status())
                ),
                Err(WorkflowError::InvalidTransition { from, to }) => {
                    prop_assert_eq!(from, status);
                    prop_assert!(!WorkflowService::is_valid_transition(from, to));
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }

    /// Approved transactions never change again.
    #[test]
    fn prop_approved_is_terminal(target in arb_status()) {
        prop_assert!(!WorkflowService::is_valid_transition(TransactionStatus::Approved, target));
    }

    /// Only a pending transaction can be decided.
    #[test]
    fn prop_decisions_require_pending(status in arb_status(), user in arb_user()) {
        let approved = WorkflowService::approve(status, user, None).is_ok();
        prop_assert_eq!(approved, status == TransactionStatus::PendingApproval);
    }

    /// Blank rejection comments are refused whatever the status.
    #[test]
    fn prop_blank_comment_rejected(status in arb_status(), user in arb_user(), spaces in " {0,10}") {
        let result = WorkflowService::reject(status, user, spaces);
        let is_comment_required = matches!(result, Err(WorkflowError::CommentRequired { .. }));
        prop_assert!(is_comment_required);
    }
}
