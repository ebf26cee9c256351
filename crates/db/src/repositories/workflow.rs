//! Postgres implementation of the workflow store.
//!
//! Multi-row writes run inside a database transaction, so a failure at
//! any step leaves the stored state untouched.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr, TransactionTrait,
};
use tracing::{debug, error};
use uuid::Uuid;

use conciliar_core::account::{Account, AccountRequest, ChartOfAccounts};
use conciliar_core::classification::{ClassificationRule, HistoryRecord};
use conciliar_core::ledger::LedgerEntry;
use conciliar_core::split::SplitLine;
use conciliar_core::store::{DecisionRecord, StoreError, WorkflowStore};
use conciliar_core::transaction::BankTransaction;
use conciliar_core::workflow::{
    ApprovalDecision, ClassificationProposal, DecisionSubject, ProposalStatus, TransactionStatus,
};
use conciliar_shared::types::{
    AccountRequestId, BankTransactionId, CounterpartId, ProposalId, TenantId,
};

use crate::entities::{
    account_requests, accounts, approval_decisions, bank_transactions, classification_history,
    classification_proposals, classification_rules, ledger_entries, ledger_lines, split_lines,
};

use super::convert;

/// Maps a database error onto the store taxonomy.
///
/// Constraint violations are conflicts with stored state; everything else
/// is a transport failure.
pub(crate) fn db_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            StoreError::Validation(format!("Duplicate value: {message}"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
            StoreError::Validation(format!("Unknown reference: {message}"))
        }
        _ => {
            error!(error = %err, "Database operation failed");
            StoreError::Transport(err.to_string())
        }
    }
}

fn not_pending(what: &str, status: &str) -> StoreError {
    StoreError::Validation(format!("{what} is already {status}"))
}

/// Workflow repository backed by Postgres.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_chart<C: ConnectionTrait>(
        conn: &C,
        tenant_id: TenantId,
    ) -> Result<ChartOfAccounts, StoreError> {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(conn)
            .await
            .map_err(db_error)?;
        let accounts = rows
            .into_iter()
            .map(convert::account_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ChartOfAccounts::new(accounts))
    }

    async fn find_transaction<C: ConnectionTrait>(
        conn: &C,
        tenant_id: TenantId,
        id: BankTransactionId,
    ) -> Result<bank_transactions::Model, StoreError> {
        bank_transactions::Entity::find_by_id(id.into_inner())
            .filter(bank_transactions::Column::TenantId.eq(tenant_id.into_inner()))
            .one(conn)
            .await
            .map_err(db_error)?
            .ok_or_else(|| StoreError::NotFound(format!("transaction {id}")))
    }

    async fn set_transaction_status<C: ConnectionTrait>(
        conn: &C,
        tenant_id: TenantId,
        id: BankTransactionId,
        status: TransactionStatus,
    ) -> Result<(), StoreError> {
        let result = bank_transactions::Entity::update_many()
            .col_expr(
                bank_transactions::Column::Status,
                Expr::value(status.as_str()),
            )
            .filter(bank_transactions::Column::Id.eq(id.into_inner()))
            .filter(bank_transactions::Column::TenantId.eq(tenant_id.into_inner()))
            .exec(conn)
            .await
            .map_err(db_error)?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    async fn decide_subject<C: ConnectionTrait>(
        conn: &C,
        decision: &ApprovalDecision,
    ) -> Result<(), StoreError> {
        let tenant = decision.tenant_id.into_inner();
        let new_status = decision.resulting_status().as_str();
        let pending = ProposalStatus::Pending.as_str();
        match decision.subject {
            DecisionSubject::Proposal(id) => {
                let row = classification_proposals::Entity::find_by_id(id.into_inner())
                    .filter(classification_proposals::Column::TenantId.eq(tenant))
                    .one(conn)
                    .await
                    .map_err(db_error)?
                    .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
                let result = classification_proposals::Entity::update_many()
                    .col_expr(classification_proposals::Column::Status, Expr::value(new_status))
                    .filter(classification_proposals::Column::Id.eq(row.id))
                    .filter(classification_proposals::Column::Status.eq(pending))
                    .exec(conn)
                    .await
                    .map_err(db_error)?;
                if result.rows_affected == 0 {
                    return Err(not_pending("proposal", &row.status));
                }
            }
            DecisionSubject::AccountRequest(id) => {
                let row = account_requests::Entity::find_by_id(id.into_inner())
                    .filter(account_requests::Column::TenantId.eq(tenant))
                    .one(conn)
                    .await
                    .map_err(db_error)?
                    .ok_or_else(|| StoreError::NotFound(format!("account request {id}")))?;
                let result = account_requests::Entity::update_many()
                    .col_expr(account_requests::Column::Status, Expr::value(new_status))
                    .filter(account_requests::Column::Id.eq(row.id))
                    .filter(account_requests::Column::Status.eq(pending))
                    .exec(conn)
                    .await
                    .map_err(db_error)?;
                if result.rows_affected == 0 {
                    return Err(not_pending("account request", &row.status));
                }
            }
        }
        Ok(())
    }

    async fn insert_ledger_entry<C: ConnectionTrait>(
        conn: &C,
        entry: &LedgerEntry,
    ) -> Result<(), StoreError> {
        let (header, lines) = convert::ledger_entry_to_active(entry)?;
        ledger_entries::Entity::insert(header)
            .exec_without_returning(conn)
            .await
            .map_err(db_error)?;
        if !lines.is_empty() {
            ledger_lines::Entity::insert_many(lines)
                .exec_without_returning(conn)
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }

    async fn upsert_rules<C: ConnectionTrait>(
        conn: &C,
        rules: &[ClassificationRule],
    ) -> Result<(), StoreError> {
        for rule in rules {
            classification_rules::Entity::insert(convert::rule_to_active(rule)?)
                .on_conflict(
                    OnConflict::column(classification_rules::Column::Id)
                        .update_columns([
                            classification_rules::Column::Name,
                            classification_rules::Column::Keywords,
                            classification_rules::Column::Status,
                            classification_rules::Column::TimesApplied,
                            classification_rules::Column::TimesApproved,
                            classification_rules::Column::TimesRejected,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for WorkflowRepository {
    async fn chart(&self, tenant_id: TenantId) -> Result<ChartOfAccounts, StoreError> {
        Self::load_chart(&self.db, tenant_id).await
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut chart = Self::load_chart(&self.db, account.tenant_id).await?;
        chart
            .insert(account.clone())
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        accounts::Entity::insert(convert::account_to_active(account))
            .exec_without_returning(&self.db)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn insert_transactions(
        &self,
        transactions: Vec<BankTransaction>,
    ) -> Result<Vec<BankTransaction>, StoreError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let mut by_tenant: HashMap<TenantId, Vec<String>> = HashMap::new();
        for tx in &transactions {
            by_tenant
                .entry(tx.tenant_id)
                .or_default()
                .push(tx.external_id.clone());
        }
        let mut seen: HashSet<(TenantId, String)> = HashSet::new();
        for (tenant_id, external_ids) in by_tenant {
            let existing = bank_transactions::Entity::find()
                .filter(bank_transactions::Column::TenantId.eq(tenant_id.into_inner()))
                .filter(bank_transactions::Column::ExternalId.is_in(external_ids))
                .all(&txn)
                .await
                .map_err(db_error)?;
            seen.extend(existing.into_iter().map(|row| (tenant_id, row.external_id)));
        }

        let mut inserted = Vec::new();
        for tx in transactions {
            if !seen.insert((tx.tenant_id, tx.external_id.clone())) {
                continue;
            }
            inserted.push(tx);
        }
        if !inserted.is_empty() {
            bank_transactions::Entity::insert_many(inserted.iter().map(convert::transaction_to_active))
                .exec_without_returning(&txn)
                .await
                .map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;
        debug!(inserted = inserted.len(), "Stored bank transactions");
        Ok(inserted)
    }

    async fn transaction(
        &self,
        tenant_id: TenantId,
        id: BankTransactionId,
    ) -> Result<BankTransaction, StoreError> {
        convert::transaction_from_model(Self::find_transaction(&self.db, tenant_id, id).await?)
    }

    async fn transactions(
        &self,
        tenant_id: TenantId,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<BankTransaction>, StoreError> {
        let mut query = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(status) = status {
            query = query.filter(bank_transactions::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_asc(bank_transactions::Column::Date)
            .order_by_asc(bank_transactions::Column::ImportedAt)
            .order_by_asc(bank_transactions::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::transaction_from_model)
            .collect()
    }

    async fn update_transaction(&self, transaction: &BankTransaction) -> Result<(), StoreError> {
        let result = bank_transactions::Entity::update_many()
            .col_expr(
                bank_transactions::Column::Status,
                Expr::value(transaction.status.as_str()),
            )
            .col_expr(
                bank_transactions::Column::CounterpartId,
                Expr::value(transaction.counterpart_id.map(CounterpartId::into_inner)),
            )
            .filter(bank_transactions::Column::Id.eq(transaction.id.into_inner()))
            .filter(bank_transactions::Column::TenantId.eq(transaction.tenant_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_error)?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("transaction {}", transaction.id)));
        }
        Ok(())
    }

    async fn proposal(
        &self,
        tenant_id: TenantId,
        id: ProposalId,
    ) -> Result<ClassificationProposal, StoreError> {
        let row = classification_proposals::Entity::find_by_id(id.into_inner())
            .filter(classification_proposals::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
        convert::proposal_from_model(row)
    }

    async fn proposals_for(
        &self,
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
    ) -> Result<Vec<ClassificationProposal>, StoreError> {
        classification_proposals::Entity::find()
            .filter(classification_proposals::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(classification_proposals::Column::TransactionId.eq(transaction_id.into_inner()))
            .order_by_asc(classification_proposals::Column::CreatedAt)
            .order_by_asc(classification_proposals::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::proposal_from_model)
            .collect()
    }

    async fn pending_proposals(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ClassificationProposal>, StoreError> {
        classification_proposals::Entity::find()
            .filter(classification_proposals::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(classification_proposals::Column::Status.eq(ProposalStatus::Pending.as_str()))
            .order_by_asc(classification_proposals::Column::CreatedAt)
            .order_by_asc(classification_proposals::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::proposal_from_model)
            .collect()
    }

    async fn supersede_and_insert_proposal(
        &self,
        proposal: &ClassificationProposal,
        split: &[SplitLine],
        transaction_status: TransactionStatus,
    ) -> Result<(), StoreError> {
        let tenant = proposal.tenant_id;
        let active = convert::proposal_to_active(proposal)?;
        let lines = split
            .iter()
            .map(|line| convert::split_line_to_active(tenant, line))
            .collect::<Result<Vec<_>, _>>()?;

        let txn = self.db.begin().await.map_err(db_error)?;
        Self::find_transaction(&txn, tenant, proposal.transaction_id).await?;

        let superseded = classification_proposals::Entity::update_many()
            .col_expr(
                classification_proposals::Column::Status,
                Expr::value(ProposalStatus::Superseded.as_str()),
            )
            .col_expr(
                classification_proposals::Column::SupersededBy,
                Expr::value(Some(proposal.id.into_inner())),
            )
            .filter(classification_proposals::Column::TenantId.eq(tenant.into_inner()))
            .filter(
                classification_proposals::Column::TransactionId
                    .eq(proposal.transaction_id.into_inner()),
            )
            .filter(classification_proposals::Column::Status.eq(ProposalStatus::Pending.as_str()))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        classification_proposals::Entity::insert(active)
            .exec_without_returning(&txn)
            .await
            .map_err(db_error)?;

        split_lines::Entity::delete_many()
            .filter(split_lines::Column::TenantId.eq(tenant.into_inner()))
            .filter(split_lines::Column::TransactionId.eq(proposal.transaction_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        if !lines.is_empty() {
            split_lines::Entity::insert_many(lines)
                .exec_without_returning(&txn)
                .await
                .map_err(db_error)?;
        }

        Self::set_transaction_status(&txn, tenant, proposal.transaction_id, transaction_status)
            .await?;
        txn.commit().await.map_err(db_error)?;

        debug!(
            proposal_id = %proposal.id,
            superseded = superseded.rows_affected,
            split_lines = split.len(),
            "Stored proposal"
        );
        Ok(())
    }

    async fn split_lines(
        &self,
        tenant_id: TenantId,
        transaction_id: BankTransactionId,
    ) -> Result<Vec<SplitLine>, StoreError> {
        split_lines::Entity::find()
            .filter(split_lines::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(split_lines::Column::TransactionId.eq(transaction_id.into_inner()))
            .order_by_asc(split_lines::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::split_line_from_model)
            .collect()
    }

    async fn record_decision(&self, record: &DecisionRecord) -> Result<(), StoreError> {
        let decision = &record.decision;
        let tenant = decision.tenant_id;
        let txn = self.db.begin().await.map_err(db_error)?;

        Self::decide_subject(&txn, decision).await?;

        if let Some((transaction_id, status)) = record.transaction_status {
            Self::set_transaction_status(&txn, tenant, transaction_id, status).await?;
        }

        if let Some(account) = &record.new_account {
            let mut chart = Self::load_chart(&txn, tenant).await?;
            chart
                .insert(account.clone())
                .map_err(|e| StoreError::Validation(e.to_string()))?;
            accounts::Entity::insert(convert::account_to_active(account))
                .exec_without_returning(&txn)
                .await
                .map_err(db_error)?;
        }

        if let Some(entry) = &record.ledger_entry {
            Self::insert_ledger_entry(&txn, entry).await?;
        }

        if let Some(history) = &record.history {
            classification_history::Entity::insert(convert::history_to_active(tenant, history))
                .exec_without_returning(&txn)
                .await
                .map_err(db_error)?;
        }

        Self::upsert_rules(&txn, &record.rules).await?;

        approval_decisions::Entity::insert(convert::decision_to_active(decision))
            .exec_without_returning(&txn)
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;
        debug!(decision_id = %decision.id, decision = %decision.decision, "Stored decision");
        Ok(())
    }

    async fn decisions(&self, tenant_id: TenantId) -> Result<Vec<ApprovalDecision>, StoreError> {
        approval_decisions::Entity::find()
            .filter(approval_decisions::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(approval_decisions::Column::DecidedAt)
            .order_by_asc(approval_decisions::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::decision_from_model)
            .collect()
    }

    async fn insert_account_request(&self, request: &AccountRequest) -> Result<(), StoreError> {
        let chart = Self::load_chart(&self.db, request.tenant_id).await?;
        if chart.by_code(&request.code).is_some() {
            return Err(StoreError::Validation(format!(
                "account code {} is already in use",
                request.code
            )));
        }
        // The partial unique index rejects a second pending request for the code.
        account_requests::Entity::insert(convert::account_request_to_active(request))
            .exec_without_returning(&self.db)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn account_request(
        &self,
        tenant_id: TenantId,
        id: AccountRequestId,
    ) -> Result<AccountRequest, StoreError> {
        let row = account_requests::Entity::find_by_id(id.into_inner())
            .filter(account_requests::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| StoreError::NotFound(format!("account request {id}")))?;
        convert::account_request_from_model(row)
    }

    async fn pending_account_requests(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<AccountRequest>, StoreError> {
        account_requests::Entity::find()
            .filter(account_requests::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(account_requests::Column::Status.eq(ProposalStatus::Pending.as_str()))
            .order_by_asc(account_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::account_request_from_model)
            .collect()
    }

    async fn rules(&self, tenant_id: TenantId) -> Result<Vec<ClassificationRule>, StoreError> {
        classification_rules::Entity::find()
            .filter(classification_rules::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(classification_rules::Column::CreatedAt)
            .order_by_asc(classification_rules::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::rule_from_model)
            .collect()
    }

    async fn history(&self, tenant_id: TenantId) -> Result<Vec<HistoryRecord>, StoreError> {
        classification_history::Entity::find()
            .filter(classification_history::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_desc(classification_history::Column::CreatedAt)
            .order_by_desc(classification_history::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(convert::history_from_model)
            .collect()
    }

    async fn ledger_entries(
        &self,
        tenant_id: TenantId,
        transaction_id: Option<BankTransactionId>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(transaction_id) = transaction_id {
            query = query
                .filter(ledger_entries::Column::TransactionId.eq(transaction_id.into_inner()));
        }
        let entries = query
            .order_by_asc(ledger_entries::Column::Date)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let mut lines_by_entry: HashMap<Uuid, Vec<ledger_lines::Model>> = HashMap::new();
        for line in ledger_lines::Entity::find()
            .filter(ledger_lines::Column::EntryId.is_in(ids))
            .order_by_asc(ledger_lines::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_error)?
        {
            lines_by_entry.entry(line.entry_id).or_default().push(line);
        }

        entries
            .into_iter()
            .map(|entry| {
                let lines = lines_by_entry.remove(&entry.id).unwrap_or_default();
                convert::ledger_entry_from_models(entry, lines)
            })
            .collect()
    }
}
