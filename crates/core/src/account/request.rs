//! Requests to open a new account, gated like proposals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{AccountId, AccountRequestId, TenantId, UserId};

use super::error::AccountError;
use super::types::{Account, AccountType, Nature};
use crate::workflow::ProposalStatus;

/// Input of a new-account request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccountInput {
    /// Requested code; suggested from the chart when absent.
    pub code: Option<String>,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Nature; defaults to the type's normal side.
    pub nature: Option<Nature>,
    /// Why the account is needed.
    pub justification: String,
}

/// A pending or decided request to create an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    /// Unique identifier.
    pub id: AccountRequestId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Requested code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Nature.
    pub nature: Nature,
    /// Why the account is needed.
    pub justification: String,
    /// Requesting user.
    pub requested_by: UserId,
    /// Review status.
    pub status: ProposalStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl AccountRequest {
    /// Creates a pending request with a resolved code.
    #[must_use]
    pub fn pending(
        tenant_id: TenantId,
        code: String,
        input: NewAccountInput,
        requested_by: UserId,
    ) -> Self {
        Self {
            id: AccountRequestId::new(),
            tenant_id,
            code,
            nature: input.nature.unwrap_or(input.account_type.default_nature()),
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            justification: input.justification.trim().to_string(),
            requested_by,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Builds the active analytical account created on approval.
    ///
    /// # Errors
    ///
    /// `InvalidCode` if the code breaks the hierarchy.
    pub fn to_account(&self) -> Result<Account, AccountError> {
        super::chart::validate_code(&self.code)?;
        let parent_code = self
            .code
            .rsplit_once('.')
            .map(|(parent, _)| parent.to_string());
        Ok(Account {
            id: AccountId::new(),
            tenant_id: self.tenant_id,
            code: self.code.clone(),
            name: self.name.clone(),
            account_type: self.account_type,
            nature: self.nature,
            analytical: true,
            active: true,
            parent_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_to_account() {
        let request = AccountRequest::pending(
            TenantId::new(),
            "4.1.1.09".into(),
            NewAccountInput {
                code: None,
                name: " Software ".into(),
                account_type: AccountType::Expense,
                nature: None,
                justification: "assinaturas de software".into(),
            },
            UserId::new(),
        );
        assert_eq!(request.status, ProposalStatus::Pending);
        assert_eq!(request.nature, Nature::Debit);
        let account = request.to_account().unwrap();
        assert_eq!(account.name, "Software");
        assert_eq!(account.parent_code.as_deref(), Some("4.1.1"));
        assert!(account.is_assignable());
    }
}
