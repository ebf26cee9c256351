//! Transaction classification.
//!
//! Produces ranked candidate accounts for a bank transaction from learned
//! rules, built-in patterns, approval history and, as a last resort, the AI
//! suggestion service. Every proposal also passes the classification guard.
//!
//! # Modules
//!
//! - `types` - Candidates, tagged suggestion sources, outcomes
//! - `keywords` - Keyword extraction for rule learning
//! - `patterns` - Built-in description patterns
//! - `rules` - Learned rules and their promotion
//! - `history` - Approved classifications of similar descriptions
//! - `guard` - Revenue, generic account and direction checks
//! - `ai` - AI suggestion boundary
//! - `classifier` - Source orchestration
//! - `error` - Classification error types

pub mod ai;
pub mod classifier;
pub mod error;
pub mod guard;
pub mod history;
pub mod keywords;
pub mod patterns;
pub mod rules;
pub mod types;

#[cfg(test)]
mod rules_props;

pub use ai::{AiAccountOption, AiCandidate, AiError, AiRequest, AiSuggestion, AiSuggestionService};
pub use classifier::Classifier;
pub use error::ClassificationError;
pub use guard::ClassificationGuard;
pub use history::HistoryRecord;
pub use keywords::extract_keywords;
pub use patterns::{KnownPattern, known_patterns};
pub use rules::{ClassificationRule, RuleDirection, RuleStatus};
pub use types::{Candidate, ClassificationOutcome, SuggestionSource};

#[cfg(test)]
pub use ai::MockAiSuggestionService;
