//! Reconciliation workflow service.
//!
//! Orchestrates import, matching, classification, proposals and review on
//! top of a [`WorkflowStore`]. Every operation takes an explicit
//! [`WorkflowContext`]; the service keeps no per-tenant state of its own.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use conciliar_shared::{AppError, AppResult};
use conciliar_shared::types::{AccountRequestId, BankTransactionId, ProposalId};

use super::context::{WorkflowContext, WorkflowSettings};
use super::types::{
    ApprovalReceipt, ClassifyResult, DecisionHistory, ImportSummary, PendingProposal, PendingQueue,
    ProposalHistory, ProposalReceipt, ProposalRequest,
};
use crate::account::{AccountError, AccountRequest, ChartOfAccounts, NewAccountInput, validate_code};
use crate::classification::{
    AiSuggestionService, ClassificationGuard, ClassificationOutcome, ClassificationRule,
    Classifier, HistoryRecord, RuleStatus, SuggestionSource,
};
use crate::import::{Boleto, parse_ofx};
use crate::ledger::LedgerService;
use crate::matching::{Counterpart, MatchOutcome, Matcher, ReconciliationReport, group_boletos};
use crate::split::SplitEngine;
use crate::store::{DecisionRecord, StoreError, WorkflowStore};
use crate::transaction::BankTransaction;
use crate::workflow::{
    ApprovalDecision, ClassificationProposal, Decision, DecisionSubject, ProposalKind,
    ProposalStatus, ProposedLine, TransactionStatus, WorkflowError, WorkflowService,
    checked_confidence,
};

/// The reconciliation workflow over a store and an optional AI service.
pub struct ReconciliationWorkflow<S> {
    store: S,
    ai: Option<Arc<dyn AiSuggestionService>>,
    settings: WorkflowSettings,
}

impl<S: WorkflowStore> ReconciliationWorkflow<S> {
    /// Creates a workflow without AI suggestions.
    #[must_use]
    pub fn new(store: S, settings: WorkflowSettings) -> Self {
        Self {
            store,
            ai: None,
            settings,
        }
    }

    /// Enables AI suggestions as the last classification source.
    #[must_use]
    pub fn with_ai(mut self, ai: Arc<dyn AiSuggestionService>) -> Self {
        self.ai = Some(ai);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The resolved settings.
    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Parses an OFX statement and stores its new transactions.
    ///
    /// Transactions whose external id is already stored are skipped, so
    /// importing the same file twice is harmless.
    pub async fn import_statement(
        &self,
        ctx: &WorkflowContext,
        content: &str,
    ) -> AppResult<ImportSummary> {
        let statement = parse_ofx(content)?;
        let parsed = statement.transactions.len();
        let transactions = statement
            .transactions
            .iter()
            .map(|line| BankTransaction::from_statement_line(ctx.tenant_id, line))
            .collect();
        let inserted = self.store.insert_transactions(transactions).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            bank = %statement.bank_name,
            parsed,
            inserted = inserted.len(),
            "Statement imported"
        );

        Ok(ImportSummary {
            bank_name: statement.bank_name,
            account_number: statement.account_number,
            parsed,
            inserted,
        })
    }

    /// Pairs imported transactions with counterparts and marks them matched.
    pub async fn match_transactions(
        &self,
        ctx: &WorkflowContext,
        counterparts: &[Counterpart],
    ) -> AppResult<MatchOutcome> {
        let transactions = self
            .store
            .transactions(ctx.tenant_id, Some(TransactionStatus::Imported))
            .await?;
        let outcome =
            Matcher::new(self.settings.match_window_days).pair(&transactions, counterparts);

        for pairing in &outcome.pairings {
            let Some(transaction) = transactions.iter().find(|t| t.id == pairing.transaction_id)
            else {
                continue;
            };
            let action = WorkflowService::mark_matched(transaction.status, pairing.counterpart_id)?;
            let mut matched = transaction.clone();
            matched.status = action.new_status();
            matched.counterpart_id = Some(pairing.counterpart_id);
            self.store.update_transaction(&matched).await?;
        }

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            matched = outcome.pairings.len(),
            unmatched = outcome.unmatched.len(),
            "Transactions matched"
        );
        Ok(outcome)
    }

    /// Ranks candidate accounts for a transaction.
    ///
    /// The transaction becomes `classified` when a usable candidate exists.
    /// When the best candidate comes from an `auto` rule at or above the
    /// auto-propose threshold, a proposal is created right away. AI failures
    /// leave the status untouched and are reported in the outcome.
    pub async fn classify(
        &self,
        ctx: &WorkflowContext,
        transaction_id: BankTransactionId,
    ) -> AppResult<ClassifyResult> {
        let mut transaction = self.load_transaction(ctx, transaction_id).await?;
        if transaction.status.is_terminal() {
            return Err(WorkflowError::InvalidTransition {
                from: transaction.status,
                to: TransactionStatus::Classified,
            }
            .into());
        }

        let chart = self.store.chart(ctx.tenant_id).await?;
        let rules = self.store.rules(ctx.tenant_id).await?;
        let history = self.store.history(ctx.tenant_id).await?;
        let outcome = Classifier::new(&chart, &rules, &history)
            .classify(&transaction, self.ai.as_deref())
            .await;

        if let Some(kind) = outcome.degraded {
            warn!(
                tenant_id = %ctx.tenant_id,
                request_id = %ctx.request_id,
                transaction_id = %transaction.id,
                kind = %kind,
                "No AI suggestion available, transaction escalated"
            );
        }

        if outcome.has_candidates()
            && let Ok(action) = WorkflowService::mark_classified(transaction.status)
        {
            transaction.status = action.new_status();
            self.store.update_transaction(&transaction).await?;
            info!(
                tenant_id = %ctx.tenant_id,
                request_id = %ctx.request_id,
                transaction_id = %transaction.id,
                candidates = outcome.candidates.len(),
                "Transaction classified"
            );
        }

        let proposal = match self.auto_proposal(&transaction, &outcome, &rules, &chart) {
            Some(request) => Some(self.submit(ctx, &transaction, &chart, request).await?.proposal),
            None => None,
        };

        Ok(ClassifyResult { outcome, proposal })
    }

    /// Proposes a single account for the whole transaction amount.
    ///
    /// A pending proposal of the same transaction is superseded.
    pub async fn propose(
        &self,
        ctx: &WorkflowContext,
        transaction_id: BankTransactionId,
        request: ProposalRequest,
    ) -> AppResult<ProposalReceipt> {
        let transaction = self.load_transaction(ctx, transaction_id).await?;
        let chart = self.store.chart(ctx.tenant_id).await?;
        self.submit(ctx, &transaction, &chart, request).await
    }

    /// Proposes a split of the transaction across several accounts.
    ///
    /// The lines must add up to the transaction amount exactly. On success
    /// the split replaces any earlier split of the transaction.
    pub async fn propose_split(
        &self,
        ctx: &WorkflowContext,
        transaction_id: BankTransactionId,
        lines: Vec<ProposedLine>,
        justification: &str,
    ) -> AppResult<ProposalReceipt> {
        let transaction = self.load_transaction(ctx, transaction_id).await?;
        let action = WorkflowService::propose(transaction.status, ctx.actor)?;
        let chart = self.store.chart(ctx.tenant_id).await?;
        let min_len = self.settings.min_justification_len;

        let proposal = ClassificationProposal::pending(
            ctx.tenant_id,
            transaction.id,
            ProposalKind::Reclassification,
            lines,
            Decimal::ONE,
            SuggestionSource::Manual,
            Some(justification.trim().to_string()),
            ctx.actor,
        );
        let split = SplitEngine::validate(
            &transaction,
            proposal.id,
            &proposal.lines,
            &chart,
            proposal.justification.as_deref(),
            min_len,
        )?;

        let mut warnings: Vec<String> = Vec::new();
        for line in &proposal.lines {
            let account = chart.require_assignable(line.account_id)?;
            for warning in ClassificationGuard::check(
                &transaction,
                account,
                proposal.justification.as_deref(),
                min_len,
            )? {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }

        self.store
            .supersede_and_insert_proposal(&proposal, &split, action.new_status())
            .await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            transaction_id = %transaction.id,
            proposal_id = %proposal.id,
            lines = split.len(),
            "Split proposed"
        );
        Ok(ProposalReceipt {
            proposal,
            split,
            warnings,
        })
    }

    /// Approves a pending proposal and writes its ledger entry.
    ///
    /// The approval is remembered for history-based suggestions and feeds
    /// rule learning.
    pub async fn approve(
        &self,
        ctx: &WorkflowContext,
        proposal_id: ProposalId,
        comment: Option<String>,
    ) -> AppResult<ApprovalReceipt> {
        let proposal = self.load_proposal(ctx, proposal_id).await?;
        let decision = self.settings.gate.decide(
            ctx.tenant_id,
            DecisionSubject::Proposal(proposal.id),
            proposal.status,
            ctx.actor,
            Decision::Approve,
            comment,
        )?;
        let transaction = self.load_transaction(ctx, proposal.transaction_id).await?;
        let action = WorkflowService::approve(transaction.status, ctx.actor, decision.comment.clone())?;

        let chart = self.store.chart(ctx.tenant_id).await?;
        let approved = ClassificationProposal {
            status: ProposalStatus::Approved,
            ..proposal.clone()
        };
        let ledger_entry = LedgerService::build_entry(
            &transaction,
            &approved,
            &chart,
            &self.settings.transit,
            ctx.actor,
        )?;
        let rules = self.store.rules(ctx.tenant_id).await?;

        let record = DecisionRecord {
            transaction_status: Some((transaction.id, action.new_status())),
            ledger_entry: Some(ledger_entry.clone()),
            history: proposal.single_account().map(|account_id| HistoryRecord {
                description: transaction.description.clone(),
                account_id,
                direction: transaction.direction(),
            }),
            rules: rules_after_approval(&transaction, &proposal, &rules, &chart),
            ..DecisionRecord::new(decision.clone())
        };
        self.store.record_decision(&record).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            transaction_id = %transaction.id,
            proposal_id = %proposal.id,
            reviewer = %ctx.actor,
            ledger_entry_id = %ledger_entry.id,
            "Proposal approved"
        );
        Ok(ApprovalReceipt {
            decision,
            ledger_entry,
        })
    }

    /// Rejects a pending proposal; a comment is mandatory.
    ///
    /// The transaction becomes `rejected` and accepts a new proposal.
    pub async fn reject(
        &self,
        ctx: &WorkflowContext,
        proposal_id: ProposalId,
        comment: &str,
    ) -> AppResult<ApprovalDecision> {
        let proposal = self.load_proposal(ctx, proposal_id).await?;
        let decision = self.settings.gate.decide(
            ctx.tenant_id,
            DecisionSubject::Proposal(proposal.id),
            proposal.status,
            ctx.actor,
            Decision::Reject,
            Some(comment.to_string()),
        )?;
        let transaction = self.load_transaction(ctx, proposal.transaction_id).await?;
        let action = WorkflowService::reject(
            transaction.status,
            ctx.actor,
            decision.comment.clone().unwrap_or_default(),
        )?;

        let mut rules = Vec::new();
        if let Some(rule_id) = proposal.source.rule_id()
            && let Some(rule) = self
                .store
                .rules(ctx.tenant_id)
                .await?
                .into_iter()
                .find(|r| r.id == rule_id)
        {
            let mut rule = rule;
            rule.record_outcome(false);
            rules.push(rule);
        }

        let record = DecisionRecord {
            transaction_status: Some((transaction.id, action.new_status())),
            rules,
            ..DecisionRecord::new(decision.clone())
        };
        self.store.record_decision(&record).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            transaction_id = %transaction.id,
            proposal_id = %proposal.id,
            reviewer = %ctx.actor,
            "Proposal rejected"
        );
        Ok(decision)
    }

    /// Asks for a new account; a reviewer decides it like a proposal.
    ///
    /// Without an explicit code, the next free code under the type's
    /// prefix is used.
    pub async fn request_account(
        &self,
        ctx: &WorkflowContext,
        input: NewAccountInput,
    ) -> AppResult<AccountRequest> {
        let min_len = self.settings.min_justification_len;
        if input.justification.trim().chars().count() < min_len {
            return Err(WorkflowError::JustificationRequired { min_len }.into());
        }
        if input.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Account name is required".to_string(),
            ));
        }

        let chart = self.store.chart(ctx.tenant_id).await?;
        let code = match input.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => code.to_string(),
            None => chart.suggest_code(input.account_type),
        };
        validate_code(&code)?;
        if chart.by_code(&code).is_some() {
            return Err(AccountError::DuplicateCode(code).into());
        }

        let request = AccountRequest::pending(ctx.tenant_id, code, input, ctx.actor);
        self.store.insert_account_request(&request).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            account_request_id = %request.id,
            code = %request.code,
            "Account requested"
        );
        Ok(request)
    }

    /// Decides a pending account request; approval adds the account.
    pub async fn decide_account_request(
        &self,
        ctx: &WorkflowContext,
        request_id: AccountRequestId,
        verdict: Decision,
        comment: Option<String>,
    ) -> AppResult<ApprovalDecision> {
        let request = self
            .store
            .account_request(ctx.tenant_id, request_id)
            .await
            .map_err(|e| not_found(e, WorkflowError::AccountRequestNotFound(request_id)))?;
        let decision = self.settings.gate.decide(
            ctx.tenant_id,
            DecisionSubject::AccountRequest(request.id),
            request.status,
            ctx.actor,
            verdict,
            comment,
        )?;

        let new_account = match verdict {
            Decision::Approve => Some(request.to_account()?),
            Decision::Reject => None,
        };
        let record = DecisionRecord {
            new_account,
            ..DecisionRecord::new(decision.clone())
        };
        self.store.record_decision(&record).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            account_request_id = %request.id,
            decision = %verdict,
            "Account request decided"
        );
        Ok(decision)
    }

    /// Everything awaiting a reviewer.
    pub async fn pending_queue(&self, ctx: &WorkflowContext) -> AppResult<PendingQueue> {
        let mut proposals = Vec::new();
        for proposal in self.store.pending_proposals(ctx.tenant_id).await? {
            let transaction = self.load_transaction(ctx, proposal.transaction_id).await?;
            let split = self
                .store
                .split_lines(ctx.tenant_id, proposal.transaction_id)
                .await?;
            proposals.push(PendingProposal {
                transaction,
                proposal,
                split,
            });
        }
        let account_requests = self.store.pending_account_requests(ctx.tenant_id).await?;
        Ok(PendingQueue {
            proposals,
            account_requests,
        })
    }

    /// Every proposal of a transaction with its decisions.
    pub async fn decision_history(
        &self,
        ctx: &WorkflowContext,
        transaction_id: BankTransactionId,
    ) -> AppResult<DecisionHistory> {
        let transaction = self.load_transaction(ctx, transaction_id).await?;
        let decisions = self.store.decisions(ctx.tenant_id).await?;
        let proposals = self
            .store
            .proposals_for(ctx.tenant_id, transaction_id)
            .await?
            .into_iter()
            .map(|proposal| {
                let subject = DecisionSubject::Proposal(proposal.id);
                let decisions = decisions
                    .iter()
                    .filter(|d| d.subject == subject)
                    .cloned()
                    .collect();
                ProposalHistory {
                    proposal,
                    decisions,
                }
            })
            .collect();
        let ledger_entries = self
            .store
            .ledger_entries(ctx.tenant_id, Some(transaction_id))
            .await?;
        Ok(DecisionHistory {
            transaction,
            proposals,
            ledger_entries,
        })
    }

    /// Lists transactions, optionally by status.
    pub async fn transactions(
        &self,
        ctx: &WorkflowContext,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<BankTransaction>> {
        Ok(self.store.transactions(ctx.tenant_id, status).await?)
    }

    /// Checks stored statement credits against a boleto listing.
    pub async fn settlement_report(
        &self,
        ctx: &WorkflowContext,
        boletos: &[Boleto],
        period: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<ReconciliationReport> {
        let transactions = self.store.transactions(ctx.tenant_id, None).await?;
        let groups = group_boletos(boletos);
        Ok(ReconciliationReport::build(
            &transactions,
            &groups,
            period,
            self.settings.match_window_days,
        ))
    }

    async fn submit(
        &self,
        ctx: &WorkflowContext,
        transaction: &BankTransaction,
        chart: &ChartOfAccounts,
        request: ProposalRequest,
    ) -> AppResult<ProposalReceipt> {
        let action = WorkflowService::propose(transaction.status, ctx.actor)?;
        let confidence = checked_confidence(request.confidence)?;
        let account = chart.require_assignable(request.account_id)?;
        let justification = request
            .justification
            .map(|j| j.trim().to_string())
            .filter(|j| !j.is_empty());
        let warnings = ClassificationGuard::check(
            transaction,
            account,
            justification.as_deref(),
            self.settings.min_justification_len,
        )?;

        let proposal = ClassificationProposal::pending(
            ctx.tenant_id,
            transaction.id,
            ProposalKind::Classification,
            vec![ProposedLine::new(account.id, transaction.amount)],
            confidence,
            request.source,
            justification,
            ctx.actor,
        );
        self.store
            .supersede_and_insert_proposal(&proposal, &[], action.new_status())
            .await?;

        info!(
            tenant_id = %ctx.tenant_id,
            request_id = %ctx.request_id,
            transaction_id = %transaction.id,
            proposal_id = %proposal.id,
            account = %account.code,
            source = proposal.source.as_str(),
            "Classification proposed"
        );
        Ok(ProposalReceipt {
            proposal,
            split: Vec::new(),
            warnings,
        })
    }

    fn auto_proposal(
        &self,
        transaction: &BankTransaction,
        outcome: &ClassificationOutcome,
        rules: &[ClassificationRule],
        chart: &ChartOfAccounts,
    ) -> Option<ProposalRequest> {
        if transaction.status == TransactionStatus::PendingApproval
            || !transaction.status.accepts_proposal()
        {
            return None;
        }
        let best = outcome.best()?;
        let rule_id = best.source.rule_id()?;
        let rule = rules.iter().find(|r| r.id == rule_id)?;
        if rule.status != RuleStatus::Auto || best.confidence < self.settings.auto_propose_threshold
        {
            return None;
        }
        let account = chart.get(best.account_id)?;
        if let Err(err) = ClassificationGuard::check(
            transaction,
            account,
            None,
            self.settings.min_justification_len,
        ) {
            debug!(transaction_id = %transaction.id, error = %err, "Automatic proposal skipped");
            return None;
        }
        Some(ProposalRequest::from_candidate(best, None))
    }

    async fn load_transaction(
        &self,
        ctx: &WorkflowContext,
        id: BankTransactionId,
    ) -> AppResult<BankTransaction> {
        self.store
            .transaction(ctx.tenant_id, id)
            .await
            .map_err(|e| not_found(e, WorkflowError::TransactionNotFound(id)))
    }

    async fn load_proposal(
        &self,
        ctx: &WorkflowContext,
        id: ProposalId,
    ) -> AppResult<ClassificationProposal> {
        self.store
            .proposal(ctx.tenant_id, id)
            .await
            .map_err(|e| not_found(e, WorkflowError::ProposalNotFound(id)))
    }
}

fn not_found(err: StoreError, missing: WorkflowError) -> AppError {
    match err {
        StoreError::NotFound(_) => missing.into(),
        other => other.into(),
    }
}

/// Rules to store after an approval.
///
/// A rule-sourced proposal counts as an approval of that rule. Any other
/// single-account approval teaches a new `learning` rule unless a rule
/// already maps the description to the same account.
fn rules_after_approval(
    transaction: &BankTransaction,
    proposal: &ClassificationProposal,
    rules: &[ClassificationRule],
    chart: &ChartOfAccounts,
) -> Vec<ClassificationRule> {
    if let Some(rule_id) = proposal.source.rule_id()
        && let Some(rule) = rules.iter().find(|r| r.id == rule_id)
    {
        let mut rule = rule.clone();
        rule.record_outcome(true);
        return vec![rule];
    }

    let Some(account_id) = proposal.single_account() else {
        return Vec::new();
    };
    if rules
        .iter()
        .any(|r| r.account_id == account_id && r.matches(transaction))
    {
        return Vec::new();
    }
    chart
        .get(account_id)
        .and_then(|account| {
            ClassificationRule::learn(
                transaction,
                account_id,
                &account.name,
                Some(proposal.created_by),
            )
        })
        .into_iter()
        .collect()
}
