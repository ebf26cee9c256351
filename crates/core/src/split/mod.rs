//! Split engine: reclassification of one transaction into several lines.
//!
//! # Modules
//!
//! - `engine` - Split validation and line construction
//! - `error` - Split error types

pub mod engine;
pub mod error;

#[cfg(test)]
mod engine_props;

pub use engine::{SplitEngine, SplitLine};
pub use error::SplitError;
