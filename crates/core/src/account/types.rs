//! Account domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

use conciliar_shared::types::{AccountId, TenantId};

/// Account type in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Assets (group 1).
    Asset,
    /// Liabilities (group 2).
    Liability,
    /// Equity.
    Equity,
    /// Revenue (group 3).
    Revenue,
    /// Expenses (group 4).
    Expense,
}

impl AccountType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asset" | "ativo" => Some(Self::Asset),
            "liability" | "passivo" => Some(Self::Liability),
            "equity" | "patrimonio" => Some(Self::Equity),
            "revenue" | "receita" => Some(Self::Revenue),
            "expense" | "despesa" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the normal balance side of accounts of this type.
    #[must_use]
    pub fn default_nature(&self) -> Nature {
        match self {
            Self::Asset | Self::Expense => Nature::Debit,
            Self::Liability | Self::Equity | Self::Revenue => Nature::Credit,
        }
    }

    /// Returns the code prefix under which new analytical accounts are created.
    #[must_use]
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Self::Asset => "1.1.2",
            Self::Liability => "2.1.1",
            Self::Equity => "2.4.1",
            Self::Revenue => "3.1.1",
            Self::Expense => "4.1.1",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normal balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    /// Debit-natured account.
    Debit,
    /// Credit-natured account.
    Credit,
}

impl Nature {
    /// Returns the string representation of the nature.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a nature from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "debit" | "devedora" => Some(Self::Debit),
            "credit" | "credora" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Hierarchical code, e.g. `4.1.1.01`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Normal balance side.
    pub nature: Nature,
    /// Analytical accounts accept postings; synthetic ones only aggregate.
    pub analytical: bool,
    /// Inactive accounts are never selectable.
    pub active: bool,
    /// Code of the synthetic parent, if any.
    pub parent_code: Option<String>,
}

impl Account {
    /// Returns true if the account may be the target of a classification.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        self.active && self.analytical
    }

    /// Returns `code - name`, the label used in prompts and reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}
