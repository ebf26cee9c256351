//! `SeaORM` entity definitions.
//!
//! Enumerations are stored as text and converted by the repositories.

pub mod account_requests;
pub mod accounts;
pub mod approval_decisions;
pub mod bank_transactions;
pub mod classification_history;
pub mod classification_proposals;
pub mod classification_rules;
pub mod ledger_entries;
pub mod ledger_lines;
pub mod split_lines;
