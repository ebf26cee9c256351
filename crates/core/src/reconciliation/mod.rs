//! Reconciliation workflow.
//!
//! Ties the importer, matcher, classifier, split engine, approval gate and
//! ledger writer together over a [`WorkflowStore`](crate::store::WorkflowStore).
//!
//! # Modules
//!
//! - `context` - Per-call context and resolved settings
//! - `types` - Operation inputs and results
//! - `service` - The workflow operations

pub mod context;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use context::{WorkflowContext, WorkflowSettings};
pub use service::ReconciliationWorkflow;
pub use types::{
    ApprovalReceipt, ClassifyResult, DecisionHistory, ImportSummary, PendingProposal, PendingQueue,
    ProposalHistory, ProposalReceipt, ProposalRequest,
};
