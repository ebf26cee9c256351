//! Conversions between `SeaORM` models and domain types.
//!
//! Enumerations are stored as text; unknown values surface as
//! `StoreError::Validation` instead of being silently coerced.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::ActiveValue::Set;

use conciliar_core::account::{Account, AccountRequest, AccountType, Nature};
use conciliar_core::classification::{
    ClassificationRule, HistoryRecord, RuleDirection, RuleStatus, SuggestionSource,
};
use conciliar_core::ledger::{EntryType, LedgerEntry, LedgerLine};
use conciliar_core::split::SplitLine;
use conciliar_core::store::StoreError;
use conciliar_core::transaction::{BankTransaction, Direction};
use conciliar_core::workflow::{
    ApprovalDecision, ClassificationProposal, Decision, DecisionSubject, ProposalKind,
    ProposalStatus, ProposedLine, TransactionStatus,
};
use conciliar_shared::types::{
    AccountId, AccountRequestId, Amount, BankTransactionId, CounterpartId, DecisionId,
    LedgerEntryId, ProposalId, RuleId, SplitLineId, TenantId, UserId,
};

use crate::entities::{
    account_requests, accounts, approval_decisions, bank_transactions, classification_history,
    classification_proposals, classification_rules, ledger_entries, ledger_lines, split_lines,
};

const SUBJECT_PROPOSAL: &str = "proposal";
const SUBJECT_ACCOUNT_REQUEST: &str = "account_request";

fn unknown(column: &str, value: &str) -> StoreError {
    StoreError::Validation(format!("Stored {column} has unknown value '{value}'"))
}

fn to_offset(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.fixed_offset()
}

fn to_utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

fn counter_to_db(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Validation(format!("Counter {value} too large")))
}

fn counter_from_db(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| unknown("rule counter", &value.to_string()))
}

pub(crate) fn parse_transaction_status(value: &str) -> Result<TransactionStatus, StoreError> {
    TransactionStatus::parse(value).ok_or_else(|| unknown("transaction status", value))
}

fn parse_proposal_status(value: &str) -> Result<ProposalStatus, StoreError> {
    ProposalStatus::parse(value).ok_or_else(|| unknown("proposal status", value))
}

fn parse_direction(value: &str) -> Result<Direction, StoreError> {
    match value {
        "credit" => Ok(Direction::Credit),
        "debit" => Ok(Direction::Debit),
        other => Err(unknown("direction", other)),
    }
}

// ============================================================================
// Accounts
// ============================================================================

pub(crate) fn account_from_model(model: accounts::Model) -> Result<Account, StoreError> {
    Ok(Account {
        id: AccountId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        account_type: AccountType::parse(&model.account_type)
            .ok_or_else(|| unknown("account type", &model.account_type))?,
        nature: Nature::parse(&model.nature).ok_or_else(|| unknown("nature", &model.nature))?,
        code: model.code,
        name: model.name,
        analytical: model.analytical,
        active: model.active,
        parent_code: model.parent_code,
    })
}

pub(crate) fn account_to_active(account: &Account) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        tenant_id: Set(account.tenant_id.into_inner()),
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.as_str().to_string()),
        nature: Set(account.nature.as_str().to_string()),
        analytical: Set(account.analytical),
        active: Set(account.active),
        parent_code: Set(account.parent_code.clone()),
    }
}

pub(crate) fn account_request_from_model(
    model: account_requests::Model,
) -> Result<AccountRequest, StoreError> {
    Ok(AccountRequest {
        id: AccountRequestId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        account_type: AccountType::parse(&model.account_type)
            .ok_or_else(|| unknown("account type", &model.account_type))?,
        nature: Nature::parse(&model.nature).ok_or_else(|| unknown("nature", &model.nature))?,
        status: parse_proposal_status(&model.status)?,
        code: model.code,
        name: model.name,
        justification: model.justification,
        requested_by: UserId::from_uuid(model.requested_by),
        created_at: to_utc(model.created_at),
    })
}

pub(crate) fn account_request_to_active(request: &AccountRequest) -> account_requests::ActiveModel {
    account_requests::ActiveModel {
        id: Set(request.id.into_inner()),
        tenant_id: Set(request.tenant_id.into_inner()),
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        account_type: Set(request.account_type.as_str().to_string()),
        nature: Set(request.nature.as_str().to_string()),
        justification: Set(request.justification.clone()),
        requested_by: Set(request.requested_by.into_inner()),
        status: Set(request.status.as_str().to_string()),
        created_at: Set(to_offset(request.created_at)),
    }
}

// ============================================================================
// Bank transactions
// ============================================================================

pub(crate) fn transaction_from_model(
    model: bank_transactions::Model,
) -> Result<BankTransaction, StoreError> {
    Ok(BankTransaction {
        id: BankTransactionId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        status: parse_transaction_status(&model.status)?,
        external_id: model.external_id,
        date: model.date,
        amount: Amount::from_minor(model.amount),
        description: model.description,
        memo: model.memo,
        reference: model.reference,
        counterpart_id: model.counterpart_id.map(CounterpartId::from_uuid),
        imported_at: to_utc(model.imported_at),
    })
}

pub(crate) fn transaction_to_active(tx: &BankTransaction) -> bank_transactions::ActiveModel {
    bank_transactions::ActiveModel {
        id: Set(tx.id.into_inner()),
        tenant_id: Set(tx.tenant_id.into_inner()),
        external_id: Set(tx.external_id.clone()),
        date: Set(tx.date),
        amount: Set(tx.amount.minor()),
        description: Set(tx.description.clone()),
        memo: Set(tx.memo.clone()),
        reference: Set(tx.reference.clone()),
        counterpart_id: Set(tx.counterpart_id.map(CounterpartId::into_inner)),
        status: Set(tx.status.as_str().to_string()),
        imported_at: Set(to_offset(tx.imported_at)),
    }
}

// ============================================================================
// Proposals and splits
// ============================================================================

pub(crate) fn proposal_from_model(
    model: classification_proposals::Model,
) -> Result<ClassificationProposal, StoreError> {
    let lines: Vec<ProposedLine> = serde_json::from_value(model.lines)
        .map_err(|e| StoreError::Validation(format!("Stored proposal lines are invalid: {e}")))?;
    let source: SuggestionSource = serde_json::from_value(model.source)
        .map_err(|e| StoreError::Validation(format!("Stored proposal source is invalid: {e}")))?;
    Ok(ClassificationProposal {
        id: ProposalId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        transaction_id: BankTransactionId::from_uuid(model.transaction_id),
        kind: ProposalKind::parse(&model.kind).ok_or_else(|| unknown("proposal kind", &model.kind))?,
        lines,
        confidence: model.confidence,
        source,
        justification: model.justification,
        status: parse_proposal_status(&model.status)?,
        created_by: UserId::from_uuid(model.created_by),
        created_at: to_utc(model.created_at),
        superseded_by: model.superseded_by.map(ProposalId::from_uuid),
    })
}

pub(crate) fn proposal_to_active(
    proposal: &ClassificationProposal,
) -> Result<classification_proposals::ActiveModel, StoreError> {
    let lines = serde_json::to_value(&proposal.lines)
        .map_err(|e| StoreError::Validation(format!("Proposal lines not serializable: {e}")))?;
    let source = serde_json::to_value(&proposal.source)
        .map_err(|e| StoreError::Validation(format!("Proposal source not serializable: {e}")))?;
    Ok(classification_proposals::ActiveModel {
        id: Set(proposal.id.into_inner()),
        tenant_id: Set(proposal.tenant_id.into_inner()),
        transaction_id: Set(proposal.transaction_id.into_inner()),
        kind: Set(proposal.kind.as_str().to_string()),
        lines: Set(lines),
        confidence: Set(proposal.confidence),
        source: Set(source),
        justification: Set(proposal.justification.clone()),
        status: Set(proposal.status.as_str().to_string()),
        created_by: Set(proposal.created_by.into_inner()),
        created_at: Set(to_offset(proposal.created_at)),
        superseded_by: Set(proposal.superseded_by.map(ProposalId::into_inner)),
    })
}

pub(crate) fn split_line_from_model(model: split_lines::Model) -> Result<SplitLine, StoreError> {
    Ok(SplitLine {
        id: SplitLineId::from_uuid(model.id),
        transaction_id: BankTransactionId::from_uuid(model.transaction_id),
        proposal_id: ProposalId::from_uuid(model.proposal_id),
        account_id: AccountId::from_uuid(model.account_id),
        amount: Amount::from_minor(model.amount),
        position: u32::try_from(model.position)
            .map_err(|_| unknown("split position", &model.position.to_string()))?,
        memo: model.memo,
    })
}

pub(crate) fn split_line_to_active(
    tenant_id: TenantId,
    line: &SplitLine,
) -> Result<split_lines::ActiveModel, StoreError> {
    Ok(split_lines::ActiveModel {
        id: Set(line.id.into_inner()),
        tenant_id: Set(tenant_id.into_inner()),
        transaction_id: Set(line.transaction_id.into_inner()),
        proposal_id: Set(line.proposal_id.into_inner()),
        account_id: Set(line.account_id.into_inner()),
        amount: Set(line.amount.minor()),
        position: Set(counter_to_db(line.position)?),
        memo: Set(line.memo.clone()),
    })
}

// ============================================================================
// Decisions
// ============================================================================

pub(crate) fn decision_from_model(
    model: approval_decisions::Model,
) -> Result<ApprovalDecision, StoreError> {
    let subject = match model.subject_type.as_str() {
        SUBJECT_PROPOSAL => DecisionSubject::Proposal(ProposalId::from_uuid(model.subject_id)),
        SUBJECT_ACCOUNT_REQUEST => {
            DecisionSubject::AccountRequest(AccountRequestId::from_uuid(model.subject_id))
        }
        other => return Err(unknown("decision subject", other)),
    };
    Ok(ApprovalDecision {
        id: DecisionId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        subject,
        reviewer: UserId::from_uuid(model.reviewer),
        decision: Decision::parse(&model.decision)
            .ok_or_else(|| unknown("decision", &model.decision))?,
        decided_at: to_utc(model.decided_at),
        comment: model.comment,
    })
}

pub(crate) fn decision_to_active(decision: &ApprovalDecision) -> approval_decisions::ActiveModel {
    let (subject_type, subject_id) = match decision.subject {
        DecisionSubject::Proposal(id) => (SUBJECT_PROPOSAL, id.into_inner()),
        DecisionSubject::AccountRequest(id) => (SUBJECT_ACCOUNT_REQUEST, id.into_inner()),
    };
    approval_decisions::ActiveModel {
        id: Set(decision.id.into_inner()),
        tenant_id: Set(decision.tenant_id.into_inner()),
        subject_type: Set(subject_type.to_string()),
        subject_id: Set(subject_id),
        reviewer: Set(decision.reviewer.into_inner()),
        decision: Set(decision.decision.as_str().to_string()),
        decided_at: Set(to_offset(decision.decided_at)),
        comment: Set(decision.comment.clone()),
    }
}

// ============================================================================
// Rules and history
// ============================================================================

pub(crate) fn rule_from_model(
    model: classification_rules::Model,
) -> Result<ClassificationRule, StoreError> {
    let keywords: Vec<String> = serde_json::from_value(model.keywords)
        .map_err(|e| StoreError::Validation(format!("Stored rule keywords are invalid: {e}")))?;
    Ok(ClassificationRule {
        id: RuleId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        keywords,
        direction: RuleDirection::parse(&model.direction)
            .ok_or_else(|| unknown("rule direction", &model.direction))?,
        min_amount: model.min_amount.map(Amount::from_minor),
        max_amount: model.max_amount.map(Amount::from_minor),
        account_id: AccountId::from_uuid(model.account_id),
        status: RuleStatus::parse(&model.status)
            .ok_or_else(|| unknown("rule status", &model.status))?,
        times_applied: counter_from_db(model.times_applied)?,
        times_approved: counter_from_db(model.times_approved)?,
        times_rejected: counter_from_db(model.times_rejected)?,
        created_by: model.created_by.map(UserId::from_uuid),
        created_at: to_utc(model.created_at),
        name: model.name,
    })
}

pub(crate) fn rule_to_active(
    rule: &ClassificationRule,
) -> Result<classification_rules::ActiveModel, StoreError> {
    Ok(classification_rules::ActiveModel {
        id: Set(rule.id.into_inner()),
        tenant_id: Set(rule.tenant_id.into_inner()),
        name: Set(rule.name.clone()),
        keywords: Set(serde_json::Value::from(rule.keywords.clone())),
        direction: Set(rule.direction.as_str().to_string()),
        min_amount: Set(rule.min_amount.map(Amount::minor)),
        max_amount: Set(rule.max_amount.map(Amount::minor)),
        account_id: Set(rule.account_id.into_inner()),
        status: Set(rule.status.as_str().to_string()),
        times_applied: Set(counter_to_db(rule.times_applied)?),
        times_approved: Set(counter_to_db(rule.times_approved)?),
        times_rejected: Set(counter_to_db(rule.times_rejected)?),
        created_by: Set(rule.created_by.map(UserId::into_inner)),
        created_at: Set(to_offset(rule.created_at)),
    })
}

pub(crate) fn history_from_model(
    model: classification_history::Model,
) -> Result<HistoryRecord, StoreError> {
    Ok(HistoryRecord {
        direction: parse_direction(&model.direction)?,
        description: model.description,
        account_id: AccountId::from_uuid(model.account_id),
    })
}

pub(crate) fn history_to_active(
    tenant_id: TenantId,
    record: &HistoryRecord,
) -> classification_history::ActiveModel {
    classification_history::ActiveModel {
        id: Set(uuid::Uuid::now_v7()),
        tenant_id: Set(tenant_id.into_inner()),
        description: Set(record.description.clone()),
        account_id: Set(record.account_id.into_inner()),
        direction: Set(record.direction.as_str().to_string()),
        created_at: Set(to_offset(Utc::now())),
    }
}

// ============================================================================
// Ledger
// ============================================================================

pub(crate) fn ledger_entry_from_models(
    entry: ledger_entries::Model,
    lines: Vec<ledger_lines::Model>,
) -> Result<LedgerEntry, StoreError> {
    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(LedgerLine {
                account_id: AccountId::from_uuid(line.account_id),
                entry_type: EntryType::parse(&line.entry_type)
                    .ok_or_else(|| unknown("entry type", &line.entry_type))?,
                account_code: line.account_code,
                amount: Amount::from_minor(line.amount),
                memo: line.memo,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(entry.id),
        tenant_id: TenantId::from_uuid(entry.tenant_id),
        transaction_id: BankTransactionId::from_uuid(entry.transaction_id),
        proposal_id: ProposalId::from_uuid(entry.proposal_id),
        date: entry.date,
        description: entry.description,
        lines,
        approved_by: UserId::from_uuid(entry.approved_by),
        created_at: to_utc(entry.created_at),
    })
}

pub(crate) fn ledger_entry_to_active(
    entry: &LedgerEntry,
) -> Result<(ledger_entries::ActiveModel, Vec<ledger_lines::ActiveModel>), StoreError> {
    let header = ledger_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        tenant_id: Set(entry.tenant_id.into_inner()),
        transaction_id: Set(entry.transaction_id.into_inner()),
        proposal_id: Set(entry.proposal_id.into_inner()),
        date: Set(entry.date),
        description: Set(entry.description.clone()),
        approved_by: Set(entry.approved_by.into_inner()),
        created_at: Set(to_offset(entry.created_at)),
    };
    let lines = entry
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let position = i32::try_from(index + 1)
                .map_err(|_| StoreError::Validation("Too many ledger lines".to_string()))?;
            Ok(ledger_lines::ActiveModel {
                id: Set(uuid::Uuid::now_v7()),
                entry_id: Set(entry.id.into_inner()),
                account_id: Set(line.account_id.into_inner()),
                account_code: Set(line.account_code.clone()),
                entry_type: Set(line.entry_type.as_str().to_string()),
                amount: Set(line.amount.minor()),
                memo: Set(line.memo.clone()),
                position: Set(position),
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    Ok((header, lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn proposal_model(source: serde_json::Value) -> classification_proposals::Model {
        classification_proposals::Model {
            id: uuid::Uuid::now_v7(),
            tenant_id: uuid::Uuid::now_v7(),
            transaction_id: uuid::Uuid::now_v7(),
            kind: "classification".to_string(),
            lines: serde_json::json!([
                { "account_id": uuid::Uuid::now_v7(), "amount": -15000, "memo": null }
            ]),
            confidence: dec!(0.85),
            source,
            justification: None,
            status: "pending".to_string(),
            created_by: uuid::Uuid::now_v7(),
            created_at: Utc::now().fixed_offset(),
            superseded_by: None,
        }
    }

    #[test]
    fn test_proposal_from_model_reads_tagged_source() {
        let rule_id = uuid::Uuid::now_v7();
        let model = proposal_model(serde_json::json!({ "kind": "rule", "rule_id": rule_id }));
        let proposal = proposal_from_model(model).unwrap();
        assert_eq!(proposal.source.rule_id(), Some(RuleId::from_uuid(rule_id)));
        assert_eq!(proposal.lines.len(), 1);
        assert_eq!(proposal.lines[0].amount, Amount::from_minor(-15000));
        assert_eq!(proposal.status, ProposalStatus::Pending);
    }

    #[test]
    fn test_unknown_status_is_reported() {
        let mut model = proposal_model(serde_json::json!({ "kind": "manual" }));
        model.status = "draft".to_string();
        let err = proposal_from_model(model).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m.contains("draft")));
    }

    #[test]
    fn test_decision_subject_columns() {
        let request_id = AccountRequestId::new();
        let decision = ApprovalDecision {
            id: DecisionId::new(),
            tenant_id: TenantId::new(),
            subject: DecisionSubject::AccountRequest(request_id),
            reviewer: UserId::new(),
            decision: Decision::Reject,
            decided_at: Utc::now(),
            comment: Some("Conta duplicada".to_string()),
        };
        let active = decision_to_active(&decision);
        assert_eq!(active.subject_type, Set(SUBJECT_ACCOUNT_REQUEST.to_string()));
        assert_eq!(active.subject_id, Set(request_id.into_inner()));
    }

    #[test]
    fn test_ledger_lines_are_numbered_from_one() {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            tenant_id: TenantId::new(),
            transaction_id: BankTransactionId::new(),
            proposal_id: ProposalId::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            description: "TARIFA PACOTE".to_string(),
            lines: vec![
                LedgerLine {
                    account_id: AccountId::new(),
                    account_code: "4.1.1.01".to_string(),
                    entry_type: EntryType::Debit,
                    amount: Amount::from_minor(4590),
                    memo: None,
                },
                LedgerLine {
                    account_id: AccountId::new(),
                    account_code: "1.1.1.01".to_string(),
                    entry_type: EntryType::Credit,
                    amount: Amount::from_minor(4590),
                    memo: None,
                },
            ],
            approved_by: UserId::new(),
            created_at: Utc::now(),
        };
        let (_, lines) = ledger_entry_to_active(&entry).unwrap();
        let positions: Vec<_> = lines.iter().map(|l| l.position.clone()).collect();
        assert_eq!(positions, vec![Set(1), Set(2)]);
    }

    #[test]
    fn test_history_direction_round_trip() {
        let model = classification_history::Model {
            id: uuid::Uuid::now_v7(),
            tenant_id: uuid::Uuid::now_v7(),
            description: "PIX ENVIADO FORNECEDOR".to_string(),
            account_id: uuid::Uuid::now_v7(),
            direction: "debit".to_string(),
            created_at: Utc::now().fixed_offset(),
        };
        assert_eq!(history_from_model(model).unwrap().direction, Direction::Debit);
    }
}
