//! Chart of accounts.
//!
//! Accounts form a dotted hierarchy (`4.1.1.01`). Only active analytical
//! accounts can receive classifications, split lines or ledger lines; every
//! other reference is rejected when it is validated.

pub mod chart;
pub mod error;
pub mod request;
pub mod types;

pub use chart::{ChartOfAccounts, is_generic_code, validate_code};
pub use error::AccountError;
pub use request::{AccountRequest, NewAccountInput};
pub use types::{Account, AccountType, Nature};
