//! Classifier: orchestrates suggestion sources into ranked candidates.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use conciliar_shared::ExternalServiceKind;

use crate::account::{Account, ChartOfAccounts};
use crate::transaction::BankTransaction;

use super::ai::{AiRequest, AiSuggestionService};
use super::guard::ClassificationGuard;
use super::history::{HistoryRecord, history_confidence, similar_accounts};
use super::patterns::known_patterns;
use super::rules::ClassificationRule;
use super::types::{Candidate, ClassificationOutcome, SuggestionSource};

/// Ranks candidate accounts for bank transactions.
///
/// Learned rules, built-in patterns and approval history are merged. The AI
/// service is asked only when they produce no decisive candidate. Inactive
/// and synthetic accounts are never returned.
pub struct Classifier<'a> {
    chart: &'a ChartOfAccounts,
    rules: &'a [ClassificationRule],
    history: &'a [HistoryRecord],
}

impl<'a> Classifier<'a> {
    /// Creates a classifier over a tenant's chart, rules and history.
    #[must_use]
    pub fn new(
        chart: &'a ChartOfAccounts,
        rules: &'a [ClassificationRule],
        history: &'a [HistoryRecord],
    ) -> Self {
        Self {
            chart,
            rules,
            history,
        }
    }

    /// Candidates from rules, patterns and history, ranked.
    ///
    /// Duplicates keep the highest confidence. Candidates forbidden by the
    /// guard are flagged and sorted last.
    #[must_use]
    pub fn deterministic(&self, transaction: &BankTransaction) -> Vec<Candidate> {
        let direction = transaction.direction();
        let mut candidates: Vec<Candidate> = Vec::new();

        for rule in self.rules.iter().filter(|r| r.matches(transaction)) {
            if let Some(account) = assignable(self.chart.get(rule.account_id)) {
                let candidate = to_candidate(
                    transaction,
                    account,
                    rule.confidence(),
                    SuggestionSource::Rule { rule_id: rule.id },
                    format!("Rule '{}' ({})", rule.name, rule.status),
                );
                merge(&mut candidates, candidate);
            }
        }

        for pattern in known_patterns()
            .iter()
            .filter(|p| p.matches(&transaction.description, direction))
        {
            if let Some(account) = assignable(self.chart.by_code(pattern.account_code)) {
                let candidate = to_candidate(
                    transaction,
                    account,
                    pattern.confidence,
                    SuggestionSource::Pattern {
                        label: pattern.label.to_string(),
                    },
                    format!("Description matches {}", pattern.label),
                );
                merge(&mut candidates, candidate);
            }
        }

        for (account_id, count) in similar_accounts(self.history, &transaction.description, direction)
        {
            if let Some(account) = assignable(self.chart.get(account_id)) {
                let candidate = to_candidate(
                    transaction,
                    account,
                    history_confidence(count),
                    SuggestionSource::History { samples: count },
                    format!("Approved {count} time(s) for similar descriptions"),
                );
                merge(&mut candidates, candidate);
            }
        }

        candidates.sort_by(rank);
        candidates
    }

    /// Classifies a transaction, asking the AI service when needed.
    ///
    /// AI failures never propagate: the outcome is marked degraded and
    /// escalated with no candidates.
    pub async fn classify(
        &self,
        transaction: &BankTransaction,
        ai: Option<&dyn AiSuggestionService>,
    ) -> ClassificationOutcome {
        let candidates = self.deterministic(transaction);
        if is_decisive(&candidates) {
            debug!(
                transaction_id = %transaction.id,
                candidates = candidates.len(),
                "Classified by deterministic sources"
            );
            return outcome(transaction, candidates, None);
        }

        let Some(ai) = ai else {
            return outcome(transaction, Vec::new(), None);
        };

        let request = AiRequest::for_transaction(transaction, self.chart.assignable());
        match ai.suggest(&request).await {
            Ok(suggestion) => {
                let mut candidates: Vec<Candidate> = Vec::new();
                for suggested in &suggestion.candidates {
                    let Some(account) = assignable(self.chart.by_code(&suggested.code)) else {
                        debug!(code = %suggested.code, "AI suggested an unknown or unassignable account");
                        continue;
                    };
                    let candidate = to_candidate(
                        transaction,
                        account,
                        suggested.confidence,
                        SuggestionSource::Ai {
                            model: suggestion.model.clone(),
                        },
                        suggestion.rationale.clone(),
                    );
                    merge(&mut candidates, candidate);
                }
                candidates.sort_by(rank);
                outcome(transaction, candidates, None)
            }
            Err(err) => {
                warn!(
                    transaction_id = %transaction.id,
                    error = %err,
                    code = err.error_code(),
                    "AI suggestion unavailable, escalating"
                );
                outcome(transaction, Vec::new(), Some(err.kind()))
            }
        }
    }
}

fn assignable(account: Option<&Account>) -> Option<&Account> {
    account.filter(|a| a.is_assignable())
}

fn to_candidate(
    transaction: &BankTransaction,
    account: &Account,
    confidence: Decimal,
    source: SuggestionSource,
    reason: String,
) -> Candidate {
    Candidate {
        account_id: account.id,
        code: account.code.clone(),
        name: account.name.clone(),
        confidence,
        source,
        reason,
        warnings: ClassificationGuard::warnings(transaction, account),
        blocked: ClassificationGuard::blocked_reason(transaction, account),
    }
}

fn merge(candidates: &mut Vec<Candidate>, candidate: Candidate) {
    match candidates
        .iter_mut()
        .find(|c| c.account_id == candidate.account_id)
    {
        Some(existing) if candidate.confidence > existing.confidence => *existing = candidate,
        Some(_) => {}
        None => candidates.push(candidate),
    }
}

/// Usable first, then confidence descending, then code.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.is_usable()
        .cmp(&a.is_usable())
        .then_with(|| b.confidence.cmp(&a.confidence))
        .then_with(|| a.code.cmp(&b.code))
}

/// A single best usable candidate exists.
fn is_decisive(candidates: &[Candidate]) -> bool {
    let mut usable = candidates.iter().filter(|c| c.is_usable());
    match (usable.next(), usable.next()) {
        (Some(_), None) => true,
        (Some(first), Some(second)) => first.confidence > second.confidence,
        _ => false,
    }
}

/// Ambiguous or empty rankings are escalated with no candidates.
fn outcome(
    transaction: &BankTransaction,
    candidates: Vec<Candidate>,
    degraded: Option<ExternalServiceKind>,
) -> ClassificationOutcome {
    if is_decisive(&candidates) {
        ClassificationOutcome {
            transaction_id: transaction.id,
            candidates,
            escalate: false,
            degraded,
        }
    } else {
        ClassificationOutcome {
            transaction_id: transaction.id,
            candidates: Vec::new(),
            escalate: true,
            degraded,
        }
    }
}
