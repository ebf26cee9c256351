//! Learned classification rules.
//!
//! Rules are created from reviewer corrections and earn autonomy as their
//! suggestions get approved:
//! - `learning` until 3 approvals with at least 80% approved
//! - `semi_auto` until 10 approvals with at least 95% approved
//! - `auto` afterwards
//!
//! A rule whose suggestions are rejected more than half of the time after 5
//! applications is disabled for good.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use conciliar_shared::types::{AccountId, Amount, RuleId, TenantId, UserId};

use super::keywords::extract_keywords;
use crate::text::normalize;
use crate::transaction::{BankTransaction, Direction};

/// Share of rule keywords that must appear in a description.
const KEYWORD_MATCH_RATIO: Decimal = Decimal::from_parts(6, 0, 0, false, 1);

/// Movements a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    /// Money in only.
    Credit,
    /// Money out only.
    Debit,
    /// Both directions.
    Both,
}

impl RuleDirection {
    /// Returns true if a movement in `direction` is covered.
    #[must_use]
    pub fn accepts(&self, direction: Direction) -> bool {
        match self {
            Self::Both => true,
            Self::Credit => direction == Direction::Credit,
            Self::Debit => direction == Direction::Debit,
        }
    }

    /// Returns the string representation of the direction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Both => "both",
        }
    }

    /// Parses a direction from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit" => Some(Self::Credit),
            "debit" => Some(Self::Debit),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl From<Direction> for RuleDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Credit => Self::Credit,
            Direction::Debit => Self::Debit,
        }
    }
}

/// Autonomy level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Newly learned; suggestions always need review.
    Learning,
    /// Reliable; suggested first.
    SemiAuto,
    /// Trusted; may be proposed automatically (still gated by review).
    Auto,
    /// Too many rejections; never applied.
    Disabled,
}

impl RuleStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::SemiAuto => "semi_auto",
            Self::Auto => "auto",
            Self::Disabled => "disabled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "learning" => Some(Self::Learning),
            "semi_auto" => Some(Self::SemiAuto),
            "auto" => Some(Self::Auto),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Confidence attached to suggestions of a rule in this status.
    #[must_use]
    pub fn confidence(&self) -> Decimal {
        match self {
            Self::Learning => Decimal::new(60, 2),
            Self::SemiAuto => Decimal::new(85, 2),
            Self::Auto => Decimal::new(95, 2),
            Self::Disabled => Decimal::ZERO,
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A learned mapping from description keywords to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Unique identifier.
    pub id: RuleId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Normalized keywords.
    pub keywords: Vec<String>,
    /// Movements covered.
    pub direction: RuleDirection,
    /// Inclusive lower bound on the absolute amount.
    pub min_amount: Option<Amount>,
    /// Inclusive upper bound on the absolute amount.
    pub max_amount: Option<Amount>,
    /// Destination account.
    pub account_id: AccountId,
    /// Autonomy level.
    pub status: RuleStatus,
    /// Times a suggestion of this rule was decided.
    pub times_applied: u32,
    /// Times it was approved.
    pub times_approved: u32,
    /// Times it was rejected.
    pub times_rejected: u32,
    /// Author, when learned from a person.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ClassificationRule {
    /// Learns a rule from an approved classification.
    ///
    /// Returns `None` when the description has no usable keywords.
    #[must_use]
    pub fn learn(
        transaction: &BankTransaction,
        account_id: AccountId,
        account_name: &str,
        created_by: Option<UserId>,
    ) -> Option<Self> {
        let keywords = extract_keywords(&transaction.description);
        if keywords.is_empty() {
            return None;
        }
        let name = format!(
            "Auto: {} → {account_name}",
            keywords.iter().take(2).cloned().collect::<Vec<_>>().join(" ")
        );
        Some(Self {
            id: RuleId::new(),
            tenant_id: transaction.tenant_id,
            name,
            keywords,
            direction: transaction.direction().into(),
            min_amount: None,
            max_amount: None,
            account_id,
            status: RuleStatus::Learning,
            times_applied: 0,
            times_approved: 0,
            times_rejected: 0,
            created_by,
            created_at: Utc::now(),
        })
    }

    /// Returns true if the rule applies to the transaction.
    #[must_use]
    pub fn matches(&self, transaction: &BankTransaction) -> bool {
        if self.status == RuleStatus::Disabled || self.keywords.is_empty() {
            return false;
        }
        if !self.direction.accepts(transaction.direction()) {
            return false;
        }
        let amount = transaction.amount.abs();
        if self.min_amount.is_some_and(|min| amount < min)
            || self.max_amount.is_some_and(|max| amount > max)
        {
            return false;
        }

        let description = normalize(&transaction.description);
        let words: Vec<&str> = description.split(' ').collect();
        let present = self
            .keywords
            .iter()
            .filter(|k| words.contains(&k.as_str()))
            .count();
        Decimal::from(present) >= Decimal::from(self.keywords.len()) * KEYWORD_MATCH_RATIO
    }

    /// Confidence of this rule's suggestions.
    #[must_use]
    pub fn confidence(&self) -> Decimal {
        self.status.confidence()
    }

    /// Share of decided suggestions that were approved.
    #[must_use]
    pub fn approval_ratio(&self) -> Decimal {
        if self.times_applied == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.times_approved) / Decimal::from(self.times_applied)
    }

    /// Records the review outcome of one of this rule's suggestions.
    pub fn record_outcome(&mut self, approved: bool) {
        self.times_applied += 1;
        if approved {
            self.times_approved += 1;
        } else {
            self.times_rejected += 1;
        }
        self.status = self.next_status();
    }

    fn next_status(&self) -> RuleStatus {
        if self.status == RuleStatus::Disabled {
            return RuleStatus::Disabled;
        }
        if self.times_applied >= 5 && self.times_rejected * 2 > self.times_applied {
            return RuleStatus::Disabled;
        }
        let ratio = self.approval_ratio();
        if self.times_approved >= 10 && ratio >= Decimal::new(95, 2) {
            RuleStatus::Auto
        } else if self.times_approved >= 3 && ratio >= Decimal::new(80, 2) {
            RuleStatus::SemiAuto
        } else {
            RuleStatus::Learning
        }
    }
}
