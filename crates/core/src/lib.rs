//! Core business logic for Conciliar.
//!
//! This crate contains the reconciliation and classification workflow with
//! ZERO web or database dependencies. Persistence and the AI service are
//! reached through the traits in `store` and `classification::ai`.
//!
//! # Modules
//!
//! - `import` - OFX statements and boleto listings
//! - `transaction` - Imported bank transactions
//! - `account` - Chart of accounts and new-account requests
//! - `matching` - Pairing transactions with counterparts
//! - `classification` - Candidate accounts from rules, patterns, history and AI
//! - `split` - Exact-sum splits across accounts
//! - `workflow` - Transaction states, proposals and the approval gate
//! - `ledger` - Balanced entries for approved proposals
//! - `store` - Persistence boundary and in-memory store
//! - `reconciliation` - Workflow orchestration

pub mod account;
pub mod classification;
pub mod import;
pub mod ledger;
pub mod matching;
pub mod reconciliation;
pub mod split;
pub mod store;
pub mod text;
pub mod transaction;
pub mod workflow;
