//! Explicit per-call context and workflow settings.

use rust_decimal::Decimal;
use uuid::Uuid;

use conciliar_shared::config::WorkflowConfig;
use conciliar_shared::types::{TenantId, UserId};

use crate::ledger::TransitAccounts;
use crate::workflow::ApprovalGate;

/// Who is acting, for which tenant, within which request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowContext {
    /// Tenant every read and write is scoped to.
    pub tenant_id: TenantId,
    /// User performing the operation.
    pub actor: UserId,
    /// Correlation id for logs.
    pub request_id: Uuid,
}

impl WorkflowContext {
    /// Creates a context with a fresh request id.
    #[must_use]
    pub fn new(tenant_id: TenantId, actor: UserId) -> Self {
        Self {
            tenant_id,
            actor,
            request_id: Uuid::now_v7(),
        }
    }
}

/// Workflow settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Reviewer authorization.
    pub gate: ApprovalGate,
    /// Minimum length of justifications and rejection comments.
    pub min_justification_len: usize,
    /// Rule confidence at which a proposal is created automatically.
    pub auto_propose_threshold: Decimal,
    /// Matching date window in days.
    pub match_window_days: i64,
    /// Transit accounts of the ledger writer.
    pub transit: TransitAccounts,
}

impl From<&WorkflowConfig> for WorkflowSettings {
    fn from(config: &WorkflowConfig) -> Self {
        let reviewers = config
            .reviewers
            .iter()
            .copied()
            .map(UserId::from_uuid)
            .collect();
        Self {
            gate: ApprovalGate::new(reviewers, config.min_justification_len),
            min_justification_len: config.min_justification_len,
            auto_propose_threshold: config.auto_propose_threshold,
            match_window_days: config.match_date_window_days,
            transit: TransitAccounts {
                credit: config.transit_credit_account.clone(),
                debit: config.transit_debit_account.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let reviewer = Uuid::now_v7();
        let config = WorkflowConfig {
            reviewers: vec![reviewer],
            ..WorkflowConfig::default()
        };
        let settings = WorkflowSettings::from(&config);
        assert!(settings.gate.is_reviewer(UserId::from_uuid(reviewer)));
        assert!(!settings.gate.is_reviewer(UserId::new()));
        assert_eq!(settings.min_justification_len, 10);
        assert_eq!(settings.transit.credit, "2.1.9.01");
        assert_eq!(settings.transit.debit, "1.1.9.01");
    }
}
