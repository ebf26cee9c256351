//! Matching domain types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{Amount, BankTransactionId, CounterpartId};

use crate::import::Boleto;

/// Kind of record a transaction can be paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartKind {
    /// A batch of boletos credited together.
    BoletoGroup,
    /// An open receivable (invoice, fee agreement).
    Receivable,
    /// A previously booked entry awaiting its bank movement.
    PriorEntry,
}

/// A record that an imported transaction may settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterpart {
    /// Unique identifier.
    pub id: CounterpartId,
    /// Kind of record.
    pub kind: CounterpartKind,
    /// Reference shared with the bank memo (`COB000123`).
    pub reference: Option<String>,
    /// Party name (payer or payee).
    pub name: Option<String>,
    /// Expected settlement date.
    pub date: NaiveDate,
    /// Signed amount, same convention as bank transactions.
    pub amount: Amount,
}

/// Boletos credited in one statement movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoletoGroup {
    /// Settlement reference.
    pub document: String,
    /// Statement date of the batch.
    pub statement_date: Option<NaiveDate>,
    /// Boletos in listing order.
    pub boletos: Vec<Boleto>,
}

impl BoletoGroup {
    /// Sum of face values.
    #[must_use]
    pub fn total_face(&self) -> Amount {
        self.boletos.iter().map(|b| b.face_value).sum()
    }

    /// Sum of received amounts.
    #[must_use]
    pub fn total_received(&self) -> Amount {
        self.boletos.iter().map(|b| b.received).sum()
    }

    /// Sum of interest and fines.
    #[must_use]
    pub fn total_interest_and_fines(&self) -> Amount {
        self.boletos.iter().map(Boleto::interest_and_fines).sum()
    }

    /// Returns the group as a counterpart record, or `None` when it has no
    /// statement date.
    #[must_use]
    pub fn to_counterpart(&self) -> Option<Counterpart> {
        let date = self.statement_date?;
        let name = match self.boletos.as_slice() {
            [single] => Some(single.payer.clone()),
            _ => None,
        };
        Some(Counterpart {
            id: CounterpartId::new(),
            kind: CounterpartKind::BoletoGroup,
            reference: Some(self.document.clone()),
            name,
            date,
            amount: self.total_received(),
        })
    }
}

/// Groups boletos by document and statement date, ordered by both.
#[must_use]
pub fn group_boletos(boletos: &[Boleto]) -> Vec<BoletoGroup> {
    let mut groups: BTreeMap<(String, Option<NaiveDate>), Vec<Boleto>> = BTreeMap::new();
    for boleto in boletos {
        groups
            .entry((boleto.document.clone(), boleto.statement_date))
            .or_default()
            .push(boleto.clone());
    }
    groups
        .into_iter()
        .map(|((document, statement_date), boletos)| BoletoGroup {
            document,
            statement_date,
            boletos,
        })
        .collect()
}

/// How strongly a pairing is supported by the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The extracted reference equals the counterpart reference.
    ExactReference,
    /// Party names overlap above the similarity threshold.
    FuzzyReference,
}

/// A transaction paired with a counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// The bank transaction.
    pub transaction_id: BankTransactionId,
    /// The counterpart.
    pub counterpart_id: CounterpartId,
    /// Reference strength.
    pub kind: MatchKind,
    /// Absolute distance in days between the two dates.
    pub day_distance: i64,
}

/// Result of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Pairings in transaction date order.
    pub pairings: Vec<Pairing>,
    /// Transactions that found no counterpart.
    pub unmatched: Vec<BankTransactionId>,
}
