//! Command-line driver for the Conciliar reconciliation workflow.
//!
//! Every command prints its result as JSON on stdout.

pub mod args;
pub mod chart;
pub mod commands;
pub mod logging;

pub use args::{AccountsCommands, Cli, Commands};
pub use commands::{Session, build_workflow};
