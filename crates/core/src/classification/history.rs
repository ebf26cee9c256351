//! Approved classifications of similar descriptions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::AccountId;

use crate::text::normalize;
use crate::transaction::Direction;

/// Number of leading description words compared for similarity.
const PREFIX_WORDS: usize = 3;

/// Maximum records consulted per classification.
pub const MAX_HISTORY_SAMPLES: usize = 5;

/// A previously approved classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Description of the classified transaction.
    pub description: String,
    /// Account it was approved to.
    pub account_id: AccountId,
    /// Cash direction of the classified transaction.
    pub direction: Direction,
}

impl HistoryRecord {
    /// Returns true if this record describes a similar movement.
    ///
    /// The leading words of `description` must appear in order in the
    /// recorded description, and directions must agree.
    #[must_use]
    pub fn is_similar(&self, description: &str, direction: Direction) -> bool {
        if self.direction != direction {
            return false;
        }
        let needle = normalize(description)
            .split(' ')
            .filter(|w| !w.is_empty())
            .take(PREFIX_WORDS)
            .collect::<Vec<_>>()
            .join(" ");
        !needle.is_empty() && normalize(&self.description).contains(&needle)
    }
}

/// Counts similar records per account, most frequent first.
///
/// At most [`MAX_HISTORY_SAMPLES`] similar records are considered.
#[must_use]
pub fn similar_accounts(
    records: &[HistoryRecord],
    description: &str,
    direction: Direction,
) -> Vec<(AccountId, u32)> {
    let mut counts: Vec<(AccountId, u32)> = Vec::new();
    for record in records
        .iter()
        .filter(|r| r.is_similar(description, direction))
        .take(MAX_HISTORY_SAMPLES)
    {
        match counts.iter_mut().find(|(id, _)| *id == record.account_id) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.account_id, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Confidence of a history suggestion seen `count` times.
#[must_use]
pub fn history_confidence(count: u32) -> Decimal {
    let confidence = Decimal::new(50, 2) + Decimal::new(10, 2) * Decimal::from(count);
    confidence.min(Decimal::new(95, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: &str, account_id: AccountId) -> HistoryRecord {
        HistoryRecord {
            description: description.into(),
            account_id,
            direction: Direction::Debit,
        }
    }

    #[test]
    fn test_similarity_on_leading_words() {
        let r = record("PIX ESCRITORIO SILVA JANEIRO", AccountId::new());
        assert!(r.is_similar("Pix Escritório Silva fevereiro", Direction::Debit));
        assert!(!r.is_similar("PIX ESCRITORIO SOUZA", Direction::Debit));
        assert!(!r.is_similar("PIX ESCRITORIO SILVA", Direction::Credit));
        assert!(!r.is_similar("  ", Direction::Debit));
    }

    #[test]
    fn test_similar_accounts_counts() {
        let a = AccountId::new();
        let b = AccountId::new();
        let records = vec![
            record("ENERGIA ENEL SP 01", a),
            record("ENERGIA ENEL SP 02", a),
            record("ENERGIA ENEL SP 03", b),
            record("OUTRA COISA", b),
        ];
        let counts = similar_accounts(&records, "ENERGIA ENEL SP 04", Direction::Debit);
        assert_eq!(counts, vec![(a, 2), (b, 1)]);
    }

    #[test]
    fn test_history_confidence_is_capped() {
        assert_eq!(history_confidence(1), Decimal::new(60, 2));
        assert_eq!(history_confidence(3), Decimal::new(80, 2));
        assert_eq!(history_confidence(9), Decimal::new(95, 2));
    }
}
