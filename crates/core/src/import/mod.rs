//! Statement import boundary.
//!
//! Parses OFX bank statements and `;`-separated boleto settlement listings
//! into normalized records. Parsing is pure; persisting the result is the
//! workflow's job.
//!
//! # Modules
//!
//! - `ofx` - OFX 1.x (SGML) and 2.x (XML) statements
//! - `memo` - Classification of statement memos and reference extraction
//! - `boleto` - Boleto settlement CSV listings
//! - `error` - Parse failures with line/field context

pub mod boleto;
pub mod error;
pub mod memo;
pub mod ofx;

pub use boleto::{Boleto, parse_boletos};
pub use error::ImportError;
pub use memo::{MemoInfo, MemoKind};
pub use ofx::{Statement, StatementLine, parse_ofx};
