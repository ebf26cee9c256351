//! Classification result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use conciliar_shared::ExternalServiceKind;
use conciliar_shared::types::{AccountId, BankTransactionId, RuleId};

/// Where a suggestion came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionSource {
    /// A learned rule.
    Rule {
        /// The rule that matched.
        rule_id: RuleId,
    },
    /// A built-in description pattern.
    Pattern {
        /// Pattern label.
        label: String,
    },
    /// Previously approved classifications.
    History {
        /// Number of similar approvals.
        samples: u32,
    },
    /// The AI suggestion service.
    Ai {
        /// Model name.
        model: String,
    },
    /// Chosen by a person.
    Manual,
}

impl SuggestionSource {
    /// Returns the string representation of the source kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule { .. } => "rule",
            Self::Pattern { .. } => "pattern",
            Self::History { .. } => "history",
            Self::Ai { .. } => "ai",
            Self::Manual => "manual",
        }
    }

    /// Returns the rule id when the source is a rule.
    #[must_use]
    pub fn rule_id(&self) -> Option<RuleId> {
        match self {
            Self::Rule { rule_id } => Some(*rule_id),
            _ => None,
        }
    }
}

/// A ranked account suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Suggested account.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Confidence, 0 to 1.
    pub confidence: Decimal,
    /// Source of the suggestion.
    pub source: SuggestionSource,
    /// Human readable reason.
    pub reason: String,
    /// Guard warnings.
    pub warnings: Vec<String>,
    /// Set when the guard forbids this account for the transaction.
    pub blocked: Option<String>,
}

impl Candidate {
    /// Returns true if the candidate may be proposed.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.blocked.is_none()
    }
}

/// Result of classifying one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// The classified transaction.
    pub transaction_id: BankTransactionId,
    /// Ranked candidates; blocked ones last.
    pub candidates: Vec<Candidate>,
    /// True when a person has to pick the account.
    pub escalate: bool,
    /// Set when the AI service failed and was skipped.
    pub degraded: Option<ExternalServiceKind>,
}

impl ClassificationOutcome {
    /// Returns the best usable candidate.
    #[must_use]
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.is_usable())
    }

    /// Returns true if at least one usable candidate exists.
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.best().is_some()
    }
}
