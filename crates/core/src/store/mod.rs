//! Persistence boundary of the workflow.
//!
//! Every read and write is scoped by tenant. Multi-row writes
//! (`supersede_and_insert_proposal`, `record_decision`) are applied
//! atomically or not at all.
//!
//! # Modules
//!
//! - `error` - Store error types
//! - `memory` - In-memory implementation

pub mod error;
pub mod memory;

use async_trait::async_trait;

use conciliar_shared::types::{AccountRequestId, BankTransactionId, ProposalId, TenantId};

use crate::account::{Account, AccountRequest, ChartOfAccounts};
use crate::classification::{ClassificationRule, HistoryRecord};
use crate::ledger::LedgerEntry;
use crate::split::SplitLine;
use crate::transaction::BankTransaction;
use crate::workflow::{ApprovalDecision, ClassificationProposal, TransactionStatus};

pub use error::StoreError;
pub use memory::MemoryStore;

/// Everything written when a reviewer decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    /// The decision itself, appended to the history.
    pub decision: ApprovalDecision,
    /// New status of the decided proposal's transaction.
    pub transaction_status: Option<(BankTransactionId, TransactionStatus)>,
    /// Entry written for an approved proposal.
    pub ledger_entry: Option<LedgerEntry>,
    /// Approved classification remembered for future suggestions.
    pub history: Option<HistoryRecord>,
    /// Rules created or updated by the decision.
    pub rules: Vec<ClassificationRule>,
    /// Account created by an approved account request.
    pub new_account: Option<Account>,
}

impl DecisionRecord {
    /// A record holding only the decision.
    #[must_use]
    pub fn new(decision: ApprovalDecision) -> Self {
        Self {
            decision,
            transaction_status: None,
            ledger_entry: None,
            history: None,
            rules: Vec::new(),
            new_account: None,
        }
    }
}

/// Storage used by the reconciliation workflow.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Returns the tenant's chart of accounts.
    async fn chart(&self, tenant_id: TenantId) -> Result<ChartOfAccounts, StoreError>;

    /// Adds an account to the chart.
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Inserts transactions, skipping external ids already stored for the
    /// tenant. Returns the inserted transactions.
    async fn insert_transactions(
        &self,
        transactions: Vec<BankTransaction>,
    ) -> Result<Vec<BankTransaction>, StoreError>;

    /// Loads one transaction.
    async fn transaction(
        &self,
        tenant_id: TenantId,
        id: BankTransactionId,
    ) -> Result<BankTransaction, StoreError>;

    /// Lists transactions, optionally filtered by status, ordered by date.
    async fn transactions(
        &self,
        tenant_id: TenantId,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<BankTransaction>, StoreError>;

    /// Overwrites status and counterpart of a transaction.
    async fn update_transaction(&self, transaction: &BankTransaction) -> Result<(), StoreError>;

    /// Loads one proposal.
    async fn proposal(
        &self,
        tenant_id: TenantId,
        id: ProposalId,
    ) -> Result<ClassificationProposal, StoreError>;

    /// Lists every proposal of a transaction, oldest first.
    async fn proposals_for(
        &self,
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
    ) -> Result<Vec<ClassificationProposal>, StoreError>;

    /// Lists pending proposals, oldest first.
    async fn pending_proposals(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ClassificationProposal>, StoreError>;

    /// Atomically supersedes the pending proposal of the transaction,
    /// inserts `proposal`, replaces the transaction's split with `split`
    /// and sets the transaction status.
    async fn supersede_and_insert_proposal(
        &self,
        proposal: &ClassificationProposal,
        split: &[SplitLine],
        transaction_status: TransactionStatus,
    ) -> Result<(), StoreError>;

    /// Returns the current split of a transaction, ordered by position.
    async fn split_lines(
        &self,
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
    ) -> Result<Vec<SplitLine>, StoreError>;

    /// Atomically appends a decision and applies its effects.
    ///
    /// Fails with `Validation` if the subject is no longer pending.
    async fn record_decision(&self, record: &DecisionRecord) -> Result<(), StoreError>;

    /// Lists all decisions of the tenant in the order they were recorded.
    async fn decisions(&self, tenant_id: TenantId) -> Result<Vec<ApprovalDecision>, StoreError>;

    /// Inserts a new-account request.
    async fn insert_account_request(&self, request: &AccountRequest) -> Result<(), StoreError>;

    /// Loads one account request.
    async fn account_request(
        &self,
        tenant_id: TenantId,
        id: AccountRequestId,
    ) -> Result<AccountRequest, StoreError>;

    /// Lists pending account requests, oldest first.
    async fn pending_account_requests(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<AccountRequest>, StoreError>;

    /// Lists the tenant's learned rules.
    async fn rules(&self, tenant_id: TenantId) -> Result<Vec<ClassificationRule>, StoreError>;

    /// Lists approved classifications, newest first.
    async fn history(&self, tenant_id: TenantId) -> Result<Vec<HistoryRecord>, StoreError>;

    /// Lists ledger entries, optionally for one transaction.
    async fn ledger_entries(
        &self,
        tenant_id: TenantId,
        transaction_id: Option<BankTransactionId>,
    ) -> Result<Vec<LedgerEntry>, StoreError>;
}
