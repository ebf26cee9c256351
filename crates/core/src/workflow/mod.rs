//! Reconciliation workflow state machine.
//!
//! This module implements the transaction lifecycle, classification
//! proposals and the approval gate that every proposal must pass before
//! the ledger is written.
//!
//! # Modules
//!
//! - `types` - Statuses, decisions and workflow actions
//! - `error` - Workflow-specific error types
//! - `service` - Transaction state transitions
//! - `proposal` - Classification proposals
//! - `decision` - Append-only review decisions
//! - `gate` - Reviewer authorization and decision rules

pub mod decision;
pub mod error;
pub mod gate;
pub mod proposal;
pub mod service;
pub mod types;

#[cfg(test)]
mod gate_props;
#[cfg(test)]
mod service_props;

pub use decision::{ApprovalDecision, DecisionSubject};
pub use error::WorkflowError;
pub use gate::ApprovalGate;
pub use proposal::{CONFIDENCE_SCALE, ClassificationProposal, ProposedLine, checked_confidence};
pub use service::WorkflowService;
pub use types::{Decision, ProposalKind, ProposalStatus, TransactionStatus, WorkflowAction};
