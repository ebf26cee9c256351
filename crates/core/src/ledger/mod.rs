//! Double-entry ledger writer.
//!
//! This module builds the entry written when a proposal is approved:
//! - Ledger lines and entries
//! - Balance validation
//! - Transit account posting rules
//! - Error types for ledger operations

pub mod entry;
pub mod error;
pub mod service;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use entry::{EntryType, LedgerEntry, LedgerLine};
pub use error::LedgerError;
pub use service::{LedgerService, TransitAccounts};
pub use validation::validate_lines;
