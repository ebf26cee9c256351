//! Pairing of bank transactions with counterpart records.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;

use conciliar_shared::types::CounterpartId;

use super::combination::find_combination;
use super::similarity::{NAME_SIMILARITY_THRESHOLD, name_similarity};
use super::types::{Counterpart, MatchKind, MatchOutcome, Pairing};
use crate::transaction::BankTransaction;

/// Matches transactions to counterparts on amount, date window and
/// reference.
///
/// A pairing needs the exact amount, a date within the window and either
/// the same reference or similar party names. Among candidates the closest
/// date wins, then an exact reference beats a fuzzy one. Each counterpart is
/// used at most once; transactions are served in date order.
#[derive(Debug, Clone)]
pub struct Matcher {
    window_days: i64,
    threshold: Decimal,
}

impl Matcher {
    /// Creates a matcher with the given date window.
    #[must_use]
    pub fn new(window_days: i64) -> Self {
        Self {
            window_days: window_days.max(0),
            threshold: NAME_SIMILARITY_THRESHOLD,
        }
    }

    /// Overrides the name similarity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the date window in days.
    #[must_use]
    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Pairs every transaction with at most one unused counterpart.
    #[must_use]
    pub fn pair(&self, transactions: &[BankTransaction], counterparts: &[Counterpart]) -> MatchOutcome {
        let mut ordered: Vec<&BankTransaction> = transactions.iter().collect();
        ordered.sort_by_key(|t| t.date);

        let mut used: HashSet<CounterpartId> = HashSet::new();
        let mut outcome = MatchOutcome::default();

        for transaction in ordered {
            let best = self
                .candidates(transaction, counterparts)
                .into_iter()
                .find(|(counterpart, _, _)| !used.contains(&counterpart.id));

            match best {
                Some((counterpart, kind, day_distance)) => {
                    debug!(
                        transaction_id = %transaction.id,
                        counterpart_id = %counterpart.id,
                        ?kind,
                        day_distance,
                        "transaction paired"
                    );
                    used.insert(counterpart.id);
                    outcome.pairings.push(Pairing {
                        transaction_id: transaction.id,
                        counterpart_id: counterpart.id,
                        kind,
                        day_distance,
                    });
                }
                None => outcome.unmatched.push(transaction.id),
            }
        }

        outcome
    }

    /// Returns the eligible counterparts for a transaction, best first.
    #[must_use]
    pub fn candidates<'c>(
        &self,
        transaction: &BankTransaction,
        counterparts: &'c [Counterpart],
    ) -> Vec<(&'c Counterpart, MatchKind, i64)> {
        let mut candidates: Vec<_> = counterparts
            .iter()
            .filter(|c| c.amount == transaction.amount)
            .filter_map(|c| {
                let distance = (c.date - transaction.date).num_days().abs();
                if distance > self.window_days {
                    return None;
                }
                self.reference_match(transaction, c).map(|kind| (c, kind, distance))
            })
            .collect();
        candidates.sort_by_key(|(_, kind, distance)| (*distance, *kind));
        candidates
    }

    fn reference_match(&self, transaction: &BankTransaction, counterpart: &Counterpart) -> Option<MatchKind> {
        if let Some(reference) = counterpart.reference.as_deref() {
            let same_reference = transaction
                .reference
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(reference));
            let mentioned = transaction
                .description
                .to_uppercase()
                .contains(&reference.to_uppercase());
            if same_reference || mentioned {
                return Some(MatchKind::ExactReference);
            }
        }

        let name = counterpart.name.as_deref()?;
        let party = transaction
            .memo_info()
            .counterpart
            .unwrap_or_else(|| transaction.description.clone());
        (name_similarity(&party, name) >= self.threshold).then_some(MatchKind::FuzzyReference)
    }

    /// Chooses open receivables within the date window whose amounts add up
    /// exactly to the transaction amount.
    #[must_use]
    pub fn settle_with_receivables(
        &self,
        transaction: &BankTransaction,
        receivables: &[Counterpart],
    ) -> Option<Vec<CounterpartId>> {
        let eligible: Vec<&Counterpart> = receivables
            .iter()
            .filter(|r| (r.date - transaction.date).num_days().abs() <= self.window_days)
            .collect();
        let amounts: Vec<_> = eligible.iter().map(|r| r.amount).collect();
        let picked = find_combination(&amounts, transaction.amount)?;
        Some(picked.into_iter().map(|i| eligible[i].id).collect())
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(2)
    }
}
