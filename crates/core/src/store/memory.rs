//! In-memory workflow store.
//!
//! One lock guards all tenants, so every multi-row write is atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use conciliar_shared::types::{AccountRequestId, BankTransactionId, ProposalId, TenantId};

use super::{DecisionRecord, StoreError, WorkflowStore};
use crate::account::{Account, AccountRequest, ChartOfAccounts};
use crate::classification::{ClassificationRule, HistoryRecord};
use crate::ledger::LedgerEntry;
use crate::split::SplitLine;
use crate::transaction::BankTransaction;
use crate::workflow::{
    ApprovalDecision, ClassificationProposal, DecisionSubject, ProposalStatus, TransactionStatus,
};

#[derive(Debug, Default)]
struct TenantData {
    chart: ChartOfAccounts,
    transactions: Vec<BankTransaction>,
    proposals: Vec<ClassificationProposal>,
    splits: HashMap<BankTransactionId, Vec<SplitLine>>,
    decisions: Vec<ApprovalDecision>,
    account_requests: Vec<AccountRequest>,
    rules: Vec<ClassificationRule>,
    history: Vec<HistoryRecord>,
    ledger: Vec<LedgerEntry>,
}

/// Workflow store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tenants: RwLock<HashMap<TenantId, TenantData>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn insert_rule(&self, rule: ClassificationRule) {
        let mut tenants = self.tenants.write().await;
        tenants.entry(rule.tenant_id).or_default().rules.push(rule);
    }

    #[cfg(test)]
    pub(crate) async fn deactivate_account(
        &self,
        tenant_id: TenantId,
        id: conciliar_shared::types::AccountId,
    ) {
        let mut tenants = self.tenants.write().await;
        let data = tenants.entry(tenant_id).or_default();
        let mut accounts = data.chart.accounts().to_vec();
        for account in accounts.iter_mut().filter(|a| a.id == id) {
            account.active = false;
        }
        data.chart = ChartOfAccounts::new(accounts);
    }
}

fn not_pending(what: &str, status: ProposalStatus) -> StoreError {
    StoreError::Validation(format!("{what} is already {status}"))
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn chart(&self, tenant_id: TenantId) -> Result<ChartOfAccounts, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| t.chart.clone())
            .unwrap_or_default())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().await;
        tenants
            .entry(account.tenant_id)
            .or_default()
            .chart
            .insert(account.clone())
            .map_err(|e| StoreError::Validation(e.to_string()))
    }

    async fn insert_transactions(
        &self,
        transactions: Vec<BankTransaction>,
    ) -> Result<Vec<BankTransaction>, StoreError> {
        let mut tenants = self.tenants.write().await;
        let mut inserted = Vec::new();
        for transaction in transactions {
            let data = tenants.entry(transaction.tenant_id).or_default();
            if data
                .transactions
                .iter()
                .any(|t| t.external_id == transaction.external_id)
            {
                continue;
            }
            data.transactions.push(transaction.clone());
            inserted.push(transaction);
        }
        Ok(inserted)
    }

    async fn transaction(
        &self,
        tenant_id: TenantId,
        id: BankTransactionId,
    ) -> Result<BankTransaction, StoreError> {
        let tenants = self.tenants.read().await;
        tenants
            .get(&tenant_id)
            .and_then(|t| t.transactions.iter().find(|tx| tx.id == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("transaction {id}")))
    }

    async fn transactions(
        &self,
        tenant_id: TenantId,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<BankTransaction>, StoreError> {
        let tenants = self.tenants.read().await;
        let mut transactions: Vec<BankTransaction> = tenants
            .get(&tenant_id)
            .map(|t| {
                t.transactions
                    .iter()
                    .filter(|tx| status.is_none_or(|s| tx.status == s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        transactions.sort_by_key(|t| t.date);
        Ok(transactions)
    }

    async fn update_transaction(&self, transaction: &BankTransaction) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().await;
        let stored = tenants
            .get_mut(&transaction.tenant_id)
            .and_then(|t| t.transactions.iter_mut().find(|tx| tx.id == transaction.id))
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", transaction.id)))?;
        stored.status = transaction.status;
        stored.counterpart_id = transaction.counterpart_id;
        Ok(())
    }

    async fn proposal(
        &self,
        tenant_id: TenantId,
        id: ProposalId,
    ) -> Result<ClassificationProposal, StoreError> {
        let tenants = self.tenants.read().await;
        tenants
            .get(&tenant_id)
            .and_then(|t| t.proposals.iter().find(|p| p.id == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))
    }

    async fn proposals_for(
        &self,
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
    ) -> Result<Vec<ClassificationProposal>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| {
                t.proposals
                    .iter()
                    .filter(|p| p.transaction_id == transaction_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn pending_proposals(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ClassificationProposal>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| t.proposals.iter().filter(|p| p.is_pending()).cloned().collect())
            .unwrap_or_default())
    }

    async fn supersede_and_insert_proposal(
        &self,
        proposal: &ClassificationProposal,
        split: &[SplitLine],
        transaction_status: TransactionStatus,
    ) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().await;
        let data = tenants
            .get_mut(&proposal.tenant_id)
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", proposal.transaction_id)))?;

        // Validate everything before the first mutation.
        let tx_index = data
            .transactions
            .iter()
            .position(|t| t.id == proposal.transaction_id)
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", proposal.transaction_id)))?;
        if data.proposals.iter().any(|p| p.id == proposal.id) {
            return Err(StoreError::Validation(format!(
                "proposal {} already exists",
                proposal.id
            )));
        }

        for existing in data
            .proposals
            .iter_mut()
            .filter(|p| p.transaction_id == proposal.transaction_id && p.is_pending())
        {
            existing.status = ProposalStatus::Superseded;
            existing.superseded_by = Some(proposal.id);
        }
        data.proposals.push(proposal.clone());
        data.splits.insert(proposal.transaction_id, split.to_vec());
        data.transactions[tx_index].status = transaction_status;
        Ok(())
    }

    async fn split_lines(
        &self,
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
    ) -> Result<Vec<SplitLine>, StoreError> {
        let tenants = self.tenants.read().await;
        let mut lines = tenants
            .get(&tenant_id)
            .and_then(|t| t.splits.get(&transaction_id))
            .cloned()
            .unwrap_or_default();
        lines.sort_by_key(|l| l.position);
        Ok(lines)
    }

    async fn record_decision(&self, record: &DecisionRecord) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().await;
        let data = tenants
            .get_mut(&record.decision.tenant_id)
            .ok_or_else(|| StoreError::NotFound("tenant".to_string()))?;
        let new_status = record.decision.resulting_status();

        // Validate everything before the first mutation.
        match record.decision.subject {
            DecisionSubject::Proposal(id) => {
                let proposal = data
                    .proposals
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
                if !proposal.is_pending() {
                    return Err(not_pending("proposal", proposal.status));
                }
            }
            DecisionSubject::AccountRequest(id) => {
                let request = data
                    .account_requests
                    .iter()
                    .find(|r| r.id == id)
                    .ok_or_else(|| StoreError::NotFound(format!("account request {id}")))?;
                if request.status != ProposalStatus::Pending {
                    return Err(not_pending("account request", request.status));
                }
            }
        }
        if let Some((transaction_id, _)) = record.transaction_status
            && !data.transactions.iter().any(|t| t.id == transaction_id)
        {
            return Err(StoreError::NotFound(format!("transaction {transaction_id}")));
        }
        let mut chart = data.chart.clone();
        if let Some(account) = &record.new_account {
            chart
                .insert(account.clone())
                .map_err(|e| StoreError::Validation(e.to_string()))?;
        }

        match record.decision.subject {
            DecisionSubject::Proposal(id) => {
                if let Some(proposal) = data.proposals.iter_mut().find(|p| p.id == id) {
                    proposal.status = new_status;
                }
            }
            DecisionSubject::AccountRequest(id) => {
                if let Some(request) = data.account_requests.iter_mut().find(|r| r.id == id) {
                    request.status = new_status;
                }
            }
        }
        if let Some((transaction_id, status)) = record.transaction_status
            && let Some(transaction) = data.transactions.iter_mut().find(|t| t.id == transaction_id)
        {
            transaction.status = status;
        }
        data.chart = chart;
        if let Some(entry) = &record.ledger_entry {
            data.ledger.push(entry.clone());
        }
        if let Some(history) = &record.history {
            data.history.insert(0, history.clone());
        }
        for rule in &record.rules {
            match data.rules.iter_mut().find(|r| r.id == rule.id) {
                Some(existing) => *existing = rule.clone(),
                None => data.rules.push(rule.clone()),
            }
        }
        data.decisions.push(record.decision.clone());
        Ok(())
    }

    async fn decisions(&self, tenant_id: TenantId) -> Result<Vec<ApprovalDecision>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| t.decisions.clone())
            .unwrap_or_default())
    }

    async fn insert_account_request(&self, request: &AccountRequest) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().await;
        let data = tenants.entry(request.tenant_id).or_default();
        if data.chart.by_code(&request.code).is_some()
            || data
                .account_requests
                .iter()
                .any(|r| r.code == request.code && r.status == ProposalStatus::Pending)
        {
            return Err(StoreError::Validation(format!(
                "account code {} is already in use",
                request.code
            )));
        }
        data.account_requests.push(request.clone());
        Ok(())
    }

    async fn account_request(
        &self,
        tenant_id: TenantId,
        id: AccountRequestId,
    ) -> Result<AccountRequest, StoreError> {
        let tenants = self.tenants.read().await;
        tenants
            .get(&tenant_id)
            .and_then(|t| t.account_requests.iter().find(|r| r.id == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account request {id}")))
    }

    async fn pending_account_requests(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<AccountRequest>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| {
                t.account_requests
                    .iter()
                    .filter(|r| r.status == ProposalStatus::Pending)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn rules(&self, tenant_id: TenantId) -> Result<Vec<ClassificationRule>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| t.rules.clone())
            .unwrap_or_default())
    }

    async fn history(&self, tenant_id: TenantId) -> Result<Vec<HistoryRecord>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| t.history.clone())
            .unwrap_or_default())
    }

    async fn ledger_entries(
        &self,
        tenant_id: TenantId,
        transaction_id: Option<BankTransactionId>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|t| {
                t.ledger
                    .iter()
                    .filter(|e| transaction_id.is_none_or(|id| e.transaction_id == id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
