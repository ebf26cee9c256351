//! Property-based tests for `ApprovalGate`.

use proptest::prelude::*;
use uuid::Uuid;

use conciliar_shared::types::{ProposalId, TenantId, UserId};

use crate::workflow::decision::DecisionSubject;
use crate::workflow::error::WorkflowError;
use crate::workflow::gate::ApprovalGate;
use crate::workflow::types::{Decision, ProposalStatus};

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

fn arb_status() -> impl Strategy<Value = ProposalStatus> {
    prop_oneof![
        Just(ProposalStatus::Pending),
        Just(ProposalStatus::Approved),
        Just(ProposalStatus::Rejected),
        Just(ProposalStatus::Superseded),
    ]
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Non-reviewers are always refused with an authorization error.
    #[test]
    fn prop_only_reviewers_decide(
        reviewers in prop::collection::vec(arb_user(), 0..4),
        actor in arb_user(),
        status in arb_status(),
        decision in arb_decision(),
    ) {
        prop_assume!(!reviewers.contains(&actor));
        let gate = ApprovalGate::new(reviewers, 10);
        let result = gate.decide(
            TenantId::new(),
            DecisionSubject::Proposal(ProposalId::new()),
            status,
            actor,
            decision,
            Some("comentario suficiente".into()),
        );
        prop_assert_eq!(result.unwrap_err(), WorkflowError::NotAReviewer { user_id: actor });
    }

    /// A decision exists only for pending subjects and matches the verdict.
    #[test]
    fn prop_decisions_only_from_pending(
        reviewer in arb_user(),
        status in arb_status(),
        decision in arb_decision(),
    ) {
        let gate = ApprovalGate::new(vec![reviewer], 10);
        let result = gate.decide(
            TenantId::new(),
            DecisionSubject::Proposal(ProposalId::new()),
            status,
            reviewer,
            decision,
            Some("comentario suficiente".into()),
        );
        match result {
            Ok(recorded) => {
                prop_assert_eq!(status, ProposalStatus::Pending);
                prop_assert_eq!(recorded.decision, decision);
                prop_assert_eq!(recorded.reviewer, reviewer);
            }
            Err(err) => {
                prop_assert!(status != ProposalStatus::Pending);
                let is_transition_error = matches!(err, WorkflowError::InvalidProposalTransition { .. });
                prop_assert!(is_transition_error);
            }
        }
    }
}
