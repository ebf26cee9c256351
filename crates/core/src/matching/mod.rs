//! Reconciliation matcher.
//!
//! Pairs imported bank transactions with counterpart records (boleto
//! settlement groups, open receivables). Transactions left unmatched go on
//! to classification.
//!
//! # Modules
//!
//! - `types` - Counterparts, boleto groups and pairings
//! - `matcher` - Amount + date window + reference pairing
//! - `similarity` - Fuzzy party-name comparison
//! - `combination` - Exact subset-sum over open receivables
//! - `report` - Settlement report of statement credits against a boleto listing

pub mod combination;
pub mod matcher;
pub mod report;
pub mod similarity;
pub mod types;

#[cfg(test)]
mod matcher_props;

pub use combination::find_combination;
pub use matcher::Matcher;
pub use report::{ReconciliationReport, ReportEntry, ReportStatus};
pub use similarity::{NAME_SIMILARITY_THRESHOLD, name_similarity, normalize_party_name};
pub use types::{BoletoGroup, Counterpart, CounterpartKind, MatchKind, MatchOutcome, Pairing, group_boletos};
