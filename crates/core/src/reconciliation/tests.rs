//! Scenario tests for the reconciliation workflow over the in-memory store.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use conciliar_shared::AppError;
use conciliar_shared::config::WorkflowConfig;
use conciliar_shared::types::{AccountId, Amount, BankTransactionId, CounterpartId, RuleId, TenantId, UserId};
use conciliar_shared::ExternalServiceKind;

use super::{ProposalRequest, ReconciliationWorkflow, WorkflowContext, WorkflowSettings};
use crate::account::{Account, AccountType, NewAccountInput};
use crate::classification::ai::MockAiSuggestionService;
use crate::classification::{
    AiError, ClassificationRule, RuleDirection, RuleStatus, SuggestionSource,
};
use crate::matching::{Counterpart, CounterpartKind};
use crate::store::{MemoryStore, WorkflowStore};
use crate::transaction::BankTransaction;
use crate::workflow::{Decision, ProposalStatus, ProposedLine, TransactionStatus};

const STATEMENT: &str = "OFXHEADER:100
DATA:OFXSGML
VERSION:102

<OFX>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<CURDEF>BRL
<BANKACCTFROM>
<BANKID>748
<ACCTID>12345-6
<ACCTTYPE>CHECKING
</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20250101
<DTEND>20250131
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20250110
<TRNAMT>1500.00
<FITID>F2
<MEMO>LIQ.COBRANCA SIMPLES-COB000123
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20250105
<TRNAMT>-89.90
<FITID>F1
<NAME>ENEL
<MEMO>DEBITO CONVENIOS-ENEL
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
";

const JUSTIFICATION: &str = "despesa sem conta especifica no plano";

struct Harness {
    workflow: ReconciliationWorkflow<MemoryStore>,
    tenant: TenantId,
    author: UserId,
    reviewer_a: UserId,
    reviewer_b: UserId,
    accounts: Vec<Account>,
}

impl Harness {
    async fn new() -> Self {
        Self::build(None, dec!(0.90)).await
    }

    async fn build(ai: Option<MockAiSuggestionService>, threshold: Decimal) -> Self {
        let tenant = TenantId::new();
        let reviewer_a = UserId::new();
        let reviewer_b = UserId::new();
        let config = WorkflowConfig {
            reviewers: vec![reviewer_a.into_inner(), reviewer_b.into_inner()],
            auto_propose_threshold: threshold,
            ..WorkflowConfig::default()
        };

        let store = MemoryStore::new();
        let accounts = vec![
            account(tenant, "1.1.9.01", AccountType::Asset, true),
            account(tenant, "2.1.9.01", AccountType::Liability, true),
            account(tenant, "3.1.1.01", AccountType::Revenue, true),
            account(tenant, "4.1.1.01", AccountType::Expense, true),
            account(tenant, "4.1.1.03", AccountType::Expense, true),
            account(tenant, "4.1.1.04", AccountType::Expense, true),
            account(tenant, "4.1.1.05", AccountType::Expense, false),
            account(tenant, "4.1.1.99", AccountType::Expense, true),
        ];
        for account in &accounts {
            store.insert_account(account).await.unwrap();
        }

        let mut workflow = ReconciliationWorkflow::new(store, WorkflowSettings::from(&config));
        if let Some(ai) = ai {
            workflow = workflow.with_ai(Arc::new(ai));
        }
        Self {
            workflow,
            tenant,
            author: UserId::new(),
            reviewer_a,
            reviewer_b,
            accounts,
        }
    }

    fn ctx(&self, actor: UserId) -> WorkflowContext {
        WorkflowContext::new(self.tenant, actor)
    }

    fn account(&self, code: &str) -> AccountId {
        self.accounts.iter().find(|a| a.code == code).unwrap().id
    }

    async fn transaction(&self, minor: i64, description: &str) -> BankTransaction {
        let transaction = BankTransaction {
            id: BankTransactionId::new(),
            tenant_id: self.tenant,
            external_id: format!("EXT-{}", BankTransactionId::new()),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            amount: Amount::from_minor(minor),
            description: description.to_string(),
            memo: None,
            reference: None,
            counterpart_id: None,
            status: TransactionStatus::Imported,
            imported_at: Utc::now(),
        };
        self.workflow
            .store()
            .insert_transactions(vec![transaction.clone()])
            .await
            .unwrap();
        transaction
    }

    async fn status(&self, id: BankTransactionId) -> TransactionStatus {
        self.workflow
            .store()
            .transaction(self.tenant, id)
            .await
            .unwrap()
            .status
    }
}

fn account(tenant_id: TenantId, code: &str, account_type: AccountType, active: bool) -> Account {
    Account {
        id: AccountId::new(),
        tenant_id,
        code: code.into(),
        name: format!("Conta {code}"),
        account_type,
        nature: account_type.default_nature(),
        analytical: true,
        active,
        parent_code: None,
    }
}

fn line(account_id: AccountId, minor: i64) -> ProposedLine {
    ProposedLine::new(account_id, Amount::from_minor(minor))
}

#[tokio::test]
async fn test_import_statement_skips_known_transactions() {
    let h = Harness::new().await;
    let ctx = h.ctx(h.author);

    let first = h.workflow.import_statement(&ctx, STATEMENT).await.unwrap();
    assert_eq!(first.bank_name, "Sicredi");
    assert_eq!(first.parsed, 2);
    assert_eq!(first.inserted.len(), 2);

    let second = h.workflow.import_statement(&ctx, STATEMENT).await.unwrap();
    assert!(second.inserted.is_empty());
    assert_eq!(second.skipped(), 2);

    let stored = h.workflow.transactions(&ctx, None).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|t| t.status == TransactionStatus::Imported));
}

#[tokio::test]
async fn test_match_marks_transactions_matched() {
    let h = Harness::new().await;
    let ctx = h.ctx(h.author);
    h.workflow.import_statement(&ctx, STATEMENT).await.unwrap();

    let counterpart = Counterpart {
        id: CounterpartId::new(),
        kind: CounterpartKind::BoletoGroup,
        reference: Some("COB000123".into()),
        name: None,
        date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        amount: Amount::from_minor(150_000),
    };
    let outcome = h
        .workflow
        .match_transactions(&ctx, std::slice::from_ref(&counterpart))
        .await
        .unwrap();
    assert_eq!(outcome.pairings.len(), 1);
    assert_eq!(outcome.unmatched.len(), 1);

    let matched = h
        .workflow
        .transactions(&ctx, Some(TransactionStatus::Matched))
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].counterpart_id, Some(counterpart.id));
}

#[tokio::test]
async fn test_split_sum_must_match_exactly() {
    let h = Harness::new().await;
    let ctx = h.ctx(h.author);
    let accepted = h.transaction(-1_000, "COMPRA MATERIAIS DIVERSOS").await;
    let refused = h.transaction(-1_000, "COMPRA MATERIAIS DIVERSOS").await;
    let (a, b, c) = (h.account("4.1.1.01"), h.account("4.1.1.03"), h.account("4.1.1.04"));

    let receipt = h
        .workflow
        .propose_split(
            &ctx,
            accepted.id,
            vec![line(a, -400), line(b, -350), line(c, -250)],
            JUSTIFICATION,
        )
        .await
        .unwrap();
    assert_eq!(receipt.split.len(), 3);
    let stored = h
        .workflow
        .store()
        .split_lines(h.tenant, accepted.id)
        .await
        .unwrap();
    let total: Amount = stored.iter().map(|l| l.amount).sum();
    assert_eq!(total, Amount::from_minor(-1_000));
    assert_eq!(h.status(accepted.id).await, TransactionStatus::PendingApproval);

    let result = h
        .workflow
        .propose_split(
            &ctx,
            refused.id,
            vec![line(a, -400), line(b, -350), line(c, -249)],
            JUSTIFICATION,
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(
        h.workflow
            .store()
            .split_lines(h.tenant, refused.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        h.workflow
            .store()
            .proposals_for(h.tenant, refused.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(h.status(refused.id).await, TransactionStatus::Imported);
}

#[tokio::test]
async fn test_inactive_account_is_refused() {
    let h = Harness::new().await;
    let ctx = h.ctx(h.author);
    let tx = h.transaction(-5_000, "COMPRA AVULSA").await;
    let inactive = h.account("4.1.1.05");

    let single = h
        .workflow
        .propose(&ctx, tx.id, ProposalRequest::manual(inactive, None))
        .await;
    assert!(matches!(single, Err(AppError::Validation(_))));

    let split = h
        .workflow
        .propose_split(
            &ctx,
            tx.id,
            vec![line(h.account("4.1.1.04"), -2_500), line(inactive, -2_500)],
            JUSTIFICATION,
        )
        .await;
    assert!(matches!(split, Err(AppError::Validation(_))));
    assert!(h.workflow.store().pending_proposals(h.tenant).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_approval_refuses_account_deactivated_after_proposal() {
    let h = Harness::new().await;
    let tx = h.transaction(-5_000, "COMPRA AVULSA").await;
    let receipt = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(h.account("4.1.1.03"), None))
        .await
        .unwrap();

    h.workflow
        .store()
        .deactivate_account(h.tenant, h.account("4.1.1.03"))
        .await;

    let result = h
        .workflow
        .approve(&h.ctx(h.reviewer_a), receipt.proposal.id, None)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let store = h.workflow.store();
    assert!(store.decisions(h.tenant).await.unwrap().is_empty());
    assert!(store.ledger_entries(h.tenant, Some(tx.id)).await.unwrap().is_empty());
    assert_eq!(
        store.proposal(h.tenant, receipt.proposal.id).await.unwrap().status,
        ProposalStatus::Pending
    );
    assert_eq!(h.status(tx.id).await, TransactionStatus::PendingApproval);
}

#[tokio::test]
async fn test_confidence_outside_unit_range_is_refused() {
    let h = Harness::new().await;
    let ctx = h.ctx(h.author);
    let tx = h.transaction(-5_000, "COMPRA AVULSA").await;

    for confidence in [dec!(7.5), dec!(-1), dec!(1.0001)] {
        let request = ProposalRequest {
            confidence,
            ..ProposalRequest::manual(h.account("4.1.1.03"), None)
        };
        let result = h.workflow.propose(&ctx, tx.id, request).await;
        assert!(matches!(result, Err(AppError::Validation(_))), "{confidence}");
    }
    assert!(h.workflow.store().pending_proposals(h.tenant).await.unwrap().is_empty());
    assert_eq!(h.status(tx.id).await, TransactionStatus::Imported);

    let request = ProposalRequest {
        confidence: dec!(0.82345),
        ..ProposalRequest::manual(h.account("4.1.1.03"), None)
    };
    let receipt = h.workflow.propose(&ctx, tx.id, request).await.unwrap();
    assert_eq!(receipt.proposal.confidence, dec!(0.8235));
}

#[tokio::test]
async fn test_new_proposal_supersedes_pending() {
    let h = Harness::new().await;
    let ctx = h.ctx(h.author);
    let tx = h.transaction(-5_000, "COMPRA AVULSA").await;

    let first = h
        .workflow
        .propose(&ctx, tx.id, ProposalRequest::manual(h.account("4.1.1.03"), None))
        .await
        .unwrap();
    let second = h
        .workflow
        .propose(&ctx, tx.id, ProposalRequest::manual(h.account("4.1.1.04"), None))
        .await
        .unwrap();

    let pending = h.workflow.store().pending_proposals(h.tenant).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.proposal.id);

    let replaced = h
        .workflow
        .store()
        .proposal(h.tenant, first.proposal.id)
        .await
        .unwrap();
    assert_eq!(replaced.status, ProposalStatus::Superseded);
    assert_eq!(replaced.superseded_by, Some(second.proposal.id));

    // A superseded proposal can no longer be decided.
    let result = h
        .workflow
        .approve(&h.ctx(h.reviewer_a), first.proposal.id, None)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_rejected_then_resubmitted_keeps_both_decisions() {
    let h = Harness::new().await;
    let tx = h.transaction(-12_000, "COMPRA AVULSA").await;

    let p1 = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(h.account("4.1.1.03"), None))
        .await
        .unwrap()
        .proposal;
    h.workflow
        .reject(&h.ctx(h.reviewer_a), p1.id, "Conta incorreta para esta despesa")
        .await
        .unwrap();
    assert_eq!(h.status(tx.id).await, TransactionStatus::Rejected);

    let p2 = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(h.account("4.1.1.04"), None))
        .await
        .unwrap()
        .proposal;
    assert_ne!(p1.id, p2.id);
    let receipt = h
        .workflow
        .approve(&h.ctx(h.reviewer_b), p2.id, Some("ok".into()))
        .await
        .unwrap();
    assert!(receipt.ledger_entry.is_balanced());
    assert_eq!(h.status(tx.id).await, TransactionStatus::Approved);

    let history = h
        .workflow
        .decision_history(&h.ctx(h.author), tx.id)
        .await
        .unwrap();
    assert_eq!(history.proposals.len(), 2);
    let first = &history.proposals[0];
    assert_eq!(first.proposal.status, ProposalStatus::Rejected);
    assert_eq!(first.decisions.len(), 1);
    assert_eq!(first.decisions[0].reviewer, h.reviewer_a);
    let second = &history.proposals[1];
    assert_eq!(second.proposal.status, ProposalStatus::Approved);
    assert_eq!(second.decisions[0].reviewer, h.reviewer_b);
    assert_eq!(history.ledger_entries.len(), 1);

    // Decided proposals stay decided.
    let again = h.workflow.approve(&h.ctx(h.reviewer_a), p1.id, None).await;
    assert!(matches!(again, Err(AppError::Validation(_))));
    assert_eq!(h.workflow.store().decisions(h.tenant).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_only_reviewers_decide() {
    let h = Harness::new().await;
    let tx = h.transaction(-12_000, "COMPRA AVULSA").await;
    let proposal = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(h.account("4.1.1.04"), None))
        .await
        .unwrap()
        .proposal;

    let result = h.workflow.approve(&h.ctx(h.author), proposal.id, None).await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
    let result = h
        .workflow
        .reject(&h.ctx(h.author), proposal.id, "Nao concordo com esta conta")
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));

    assert_eq!(h.status(tx.id).await, TransactionStatus::PendingApproval);
    assert!(h.workflow.store().decisions(h.tenant).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reject_requires_comment() {
    let h = Harness::new().await;
    let tx = h.transaction(-12_000, "COMPRA AVULSA").await;
    let proposal = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(h.account("4.1.1.04"), None))
        .await
        .unwrap()
        .proposal;

    let result = h.workflow.reject(&h.ctx(h.reviewer_a), proposal.id, "  curto ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.status(tx.id).await, TransactionStatus::PendingApproval);
}

#[tokio::test]
async fn test_ai_quota_leaves_transaction_untouched() {
    let mut ai = MockAiSuggestionService::new();
    ai.expect_suggest()
        .times(2)
        .returning(|_| Err(AiError::QuotaExceeded("monthly quota".into())));
    let h = Harness::build(Some(ai), dec!(0.90)).await;
    let ctx = h.ctx(h.author);

    let imported = h.transaction(-7_500, "PAGAMENTO FORNECEDOR XPTO").await;
    let mut matched = h.transaction(-7_500, "PAGAMENTO FORNECEDOR XPTO").await;
    matched.status = TransactionStatus::Matched;
    matched.counterpart_id = Some(CounterpartId::new());
    h.workflow.store().update_transaction(&matched).await.unwrap();

    for (id, expected) in [
        (imported.id, TransactionStatus::Imported),
        (matched.id, TransactionStatus::Matched),
    ] {
        let result = h.workflow.classify(&ctx, id).await.unwrap();
        assert!(result.outcome.candidates.is_empty());
        assert!(result.outcome.escalate);
        assert_eq!(result.outcome.degraded, Some(ExternalServiceKind::QuotaExceeded));
        assert!(result.proposal.is_none());
        assert_eq!(h.status(id).await, expected);
    }
}

#[tokio::test]
async fn test_approval_teaches_rule_and_history() {
    let h = Harness::new().await;
    let stationery = h.account("4.1.1.04");
    let tx = h.transaction(-3_000, "PAPELARIA CENTRAL LTDA").await;
    let proposal = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(stationery, None))
        .await
        .unwrap()
        .proposal;
    h.workflow
        .approve(&h.ctx(h.reviewer_a), proposal.id, None)
        .await
        .unwrap();

    let rules = h.workflow.store().rules(h.tenant).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].account_id, stationery);
    assert_eq!(rules[0].status, RuleStatus::Learning);
    assert_eq!(rules[0].created_by, Some(h.author));
    assert_eq!(h.workflow.store().history(h.tenant).await.unwrap().len(), 1);

    let next = h.transaction(-4_500, "PAPELARIA CENTRAL LTDA FILIAL").await;
    let result = h.workflow.classify(&h.ctx(h.author), next.id).await.unwrap();
    let best = result.outcome.best().unwrap();
    assert_eq!(best.account_id, stationery);
    assert!(result.proposal.is_none());
    assert_eq!(h.status(next.id).await, TransactionStatus::Classified);
}

fn auto_rule(h: &Harness) -> ClassificationRule {
    ClassificationRule {
        id: RuleId::new(),
        tenant_id: h.tenant,
        name: "Mensalidade clube".into(),
        keywords: vec!["mensalidade".into(), "clube".into()],
        direction: RuleDirection::Debit,
        min_amount: None,
        max_amount: None,
        account_id: h.account("4.1.1.04"),
        status: RuleStatus::Auto,
        times_applied: 12,
        times_approved: 12,
        times_rejected: 0,
        created_by: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_auto_rule_proposes_and_counts_approval() {
    let h = Harness::new().await;
    let rule = auto_rule(&h);
    h.workflow.store().insert_rule(rule.clone()).await;
    let tx = h.transaction(-15_000, "MENSALIDADE CLUBE ALFA").await;

    let result = h.workflow.classify(&h.ctx(h.author), tx.id).await.unwrap();
    let proposal = result.proposal.unwrap();
    assert_eq!(proposal.source, SuggestionSource::Rule { rule_id: rule.id });
    assert_eq!(h.status(tx.id).await, TransactionStatus::PendingApproval);

    h.workflow
        .approve(&h.ctx(h.reviewer_a), proposal.id, None)
        .await
        .unwrap();
    let rules = h.workflow.store().rules(h.tenant).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].times_approved, 13);
    assert_eq!(rules[0].times_applied, 13);
}

#[tokio::test]
async fn test_auto_proposal_respects_threshold() {
    let h = Harness::build(None, dec!(0.99)).await;
    h.workflow.store().insert_rule(auto_rule(&h)).await;
    let tx = h.transaction(-15_000, "MENSALIDADE CLUBE ALFA").await;

    let result = h.workflow.classify(&h.ctx(h.author), tx.id).await.unwrap();
    assert!(result.proposal.is_none());
    assert!(result.outcome.has_candidates());
    assert_eq!(h.status(tx.id).await, TransactionStatus::Classified);
}

#[tokio::test]
async fn test_capital_contribution_is_not_revenue() {
    let h = Harness::new().await;
    let tx = h.transaction(500_000, "APORTE SOCIO JOAO").await;
    let result = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(h.account("3.1.1.01"), None))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.status(tx.id).await, TransactionStatus::Imported);
}

#[tokio::test]
async fn test_generic_account_needs_justification() {
    let h = Harness::new().await;
    let tx = h.transaction(-2_000, "COMPRA AVULSA").await;
    let generic = h.account("4.1.1.99");

    let missing = h
        .workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(generic, None))
        .await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    let receipt = h
        .workflow
        .propose(
            &h.ctx(h.author),
            tx.id,
            ProposalRequest::manual(generic, Some(JUSTIFICATION.into())),
        )
        .await
        .unwrap();
    assert!(!receipt.warnings.is_empty());
    assert_eq!(receipt.proposal.justification.as_deref(), Some(JUSTIFICATION));
}

#[tokio::test]
async fn test_account_request_goes_through_review() {
    let h = Harness::new().await;
    let input = NewAccountInput {
        code: Some("4.1.1.06".into()),
        name: "Cursos e treinamentos".into(),
        account_type: AccountType::Expense,
        nature: None,
        justification: "treinamentos recorrentes da equipe".into(),
    };

    let short = NewAccountInput {
        justification: "curto".into(),
        ..input.clone()
    };
    let result = h.workflow.request_account(&h.ctx(h.author), short).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let request = h
        .workflow
        .request_account(&h.ctx(h.author), input)
        .await
        .unwrap();
    let queue = h.workflow.pending_queue(&h.ctx(h.reviewer_a)).await.unwrap();
    assert_eq!(queue.account_requests.len(), 1);

    let outsider = h
        .workflow
        .decide_account_request(&h.ctx(h.author), request.id, Decision::Approve, None)
        .await;
    assert!(matches!(outsider, Err(AppError::Authorization(_))));

    h.workflow
        .decide_account_request(&h.ctx(h.reviewer_a), request.id, Decision::Approve, None)
        .await
        .unwrap();
    let chart = h.workflow.store().chart(h.tenant).await.unwrap();
    let created = chart.by_code("4.1.1.06").unwrap();
    assert!(created.is_assignable());
    assert!(h.workflow.pending_queue(&h.ctx(h.reviewer_a)).await.unwrap().is_empty());

    // The new account is immediately usable.
    let tx = h.transaction(-9_900, "CURSO ONLINE").await;
    h.workflow
        .propose(&h.ctx(h.author), tx.id, ProposalRequest::manual(created.id, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_pending_queue_lists_split_lines() {
    let h = Harness::new().await;
    let tx = h.transaction(-1_000, "COMPRA MATERIAIS DIVERSOS").await;
    h.workflow
        .propose_split(
            &h.ctx(h.author),
            tx.id,
            vec![line(h.account("4.1.1.03"), -600), line(h.account("4.1.1.04"), -400)],
            JUSTIFICATION,
        )
        .await
        .unwrap();

    let queue = h.workflow.pending_queue(&h.ctx(h.reviewer_a)).await.unwrap();
    assert_eq!(queue.proposals.len(), 1);
    let pending = &queue.proposals[0];
    assert_eq!(pending.transaction.id, tx.id);
    assert_eq!(pending.split.len(), 2);
    assert_eq!(pending.split[0].position, 1);

    let receipt = h
        .workflow
        .approve(&h.ctx(h.reviewer_b), pending.proposal.id, None)
        .await
        .unwrap();
    assert_eq!(receipt.ledger_entry.lines.len(), 3);
    // Splits teach no rule.
    assert!(h.workflow.store().rules(h.tenant).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_transaction_is_not_found() {
    let h = Harness::new().await;
    let result = h
        .workflow
        .classify(&h.ctx(h.author), BankTransactionId::new())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
