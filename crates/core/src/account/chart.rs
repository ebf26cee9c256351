//! Chart of accounts lookups and code rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::AccountId;

use super::error::AccountError;
use super::types::{Account, AccountType};

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("account code pattern is valid")
});

/// Codes of catch-all accounts that need a written justification.
const GENERIC_CODES: [&str; 5] = ["4.1.1.08", "4.1.1.99", "3.1.1.99", "1.1.9.01", "2.1.9.01"];

/// Validates that a code follows the four-level `X.X.X.XX` hierarchy.
///
/// # Errors
///
/// Returns `AccountError::InvalidCode` otherwise.
pub fn validate_code(code: &str) -> Result<(), AccountError> {
    if CODE_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(AccountError::InvalidCode(code.to_string()))
    }
}

/// Returns true for generic (catch-all and transit) account codes.
#[must_use]
pub fn is_generic_code(code: &str) -> bool {
    GENERIC_CODES.iter().any(|generic| code.starts_with(generic))
}

/// A tenant's chart of accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
}

impl ChartOfAccounts {
    /// Creates a chart ordered by code.
    #[must_use]
    pub fn new(mut accounts: Vec<Account>) -> Self {
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Self { accounts }
    }

    /// Returns every account, active or not.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Returns the accounts that may receive classifications.
    pub fn assignable(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter().filter(|a| a.is_assignable())
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Looks up an account by code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.code == code)
    }

    /// Returns the account if it exists, is active and analytical.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Inactive` or `Synthetic`.
    pub fn require_assignable(&self, id: AccountId) -> Result<&Account, AccountError> {
        let account = self.get(id).ok_or(AccountError::NotFound(id))?;
        Self::check_assignable(account)?;
        Ok(account)
    }

    /// Same as [`Self::require_assignable`] but by code.
    ///
    /// # Errors
    ///
    /// Returns `CodeNotFound`, `Inactive` or `Synthetic`.
    pub fn require_assignable_code(&self, code: &str) -> Result<&Account, AccountError> {
        let account = self
            .by_code(code)
            .ok_or_else(|| AccountError::CodeNotFound(code.to_string()))?;
        Self::check_assignable(account)?;
        Ok(account)
    }

    fn check_assignable(account: &Account) -> Result<(), AccountError> {
        if !account.active {
            return Err(AccountError::Inactive {
                code: account.code.clone(),
            });
        }
        if !account.analytical {
            return Err(AccountError::Synthetic {
                code: account.code.clone(),
            });
        }
        Ok(())
    }

    /// Suggests the next free code under the type's prefix.
    ///
    /// Takes the highest existing last segment under the prefix and adds one,
    /// zero padded to two digits; `{prefix}.01` when the prefix is empty.
    #[must_use]
    pub fn suggest_code(&self, account_type: AccountType) -> String {
        let prefix = account_type.code_prefix();
        let next = self
            .accounts
            .iter()
            .filter_map(|a| a.code.strip_prefix(prefix)?.strip_prefix('.'))
            .filter_map(|last| last.parse::<u32>().ok())
            .max()
            .map_or(1, |max| max + 1);
        format!("{prefix}.{next:02}")
    }

    /// Adds an account, rejecting invalid or duplicate codes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` or `DuplicateCode`.
    pub fn insert(&mut self, account: Account) -> Result<(), AccountError> {
        validate_code(&account.code)?;
        if self.by_code(&account.code).is_some() {
            return Err(AccountError::DuplicateCode(account.code));
        }
        let position = self
            .accounts
            .partition_point(|existing| existing.code < account.code);
        self.accounts.insert(position, account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conciliar_shared::types::TenantId;
    use rstest::rstest;

    fn account(code: &str, account_type: AccountType, active: bool, analytical: bool) -> Account {
        Account {
            id: AccountId::new(),
            tenant_id: TenantId::new(),
            code: code.to_string(),
            name: format!("Conta {code}"),
            account_type,
            nature: account_type.default_nature(),
            analytical,
            active,
            parent_code: None,
        }
    }

    fn chart() -> ChartOfAccounts {
        ChartOfAccounts::new(vec![
            account("4.1.1.02", AccountType::Expense, true, true),
            account("4.1.1.01", AccountType::Expense, true, true),
            account("4.1.1.07", AccountType::Expense, false, true),
            account("4.1.1", AccountType::Expense, true, false),
            account("3.1.1.01", AccountType::Revenue, true, true),
        ])
    }

    #[rstest]
    #[case("4.1.1.01", true)]
    #[case("1.1.2.10", true)]
    #[case("4.1.1", false)]
    #[case("4.1.1.a", false)]
    #[case("", false)]
    fn test_validate_code(#[case] code: &str, #[case] valid: bool) {
        assert_eq!(validate_code(code).is_ok(), valid);
    }

    #[rstest]
    #[case("4.1.1.08", true)]
    #[case("4.1.1.99", true)]
    #[case("2.1.9.01", true)]
    #[case("4.1.1.01", false)]
    fn test_generic_codes(#[case] code: &str, #[case] generic: bool) {
        assert_eq!(is_generic_code(code), generic);
    }

    #[test]
    fn test_chart_sorted_by_code() {
        let chart = chart();
        let codes: Vec<_> = chart.accounts().iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["3.1.1.01", "4.1.1", "4.1.1.01", "4.1.1.02", "4.1.1.07"]);
    }

    #[test]
    fn test_require_assignable_rejects_inactive_and_synthetic() {
        let chart = chart();
        assert!(matches!(
            chart.require_assignable_code("4.1.1.07"),
            Err(AccountError::Inactive { .. })
        ));
        assert!(matches!(
            chart.require_assignable_code("4.1.1"),
            Err(AccountError::Synthetic { .. })
        ));
        assert!(matches!(
            chart.require_assignable_code("9.9.9.99"),
            Err(AccountError::CodeNotFound(_))
        ));
        assert!(chart.require_assignable_code("4.1.1.01").is_ok());
        assert!(matches!(
            chart.require_assignable(AccountId::new()),
            Err(AccountError::NotFound(_))
        ));
    }

    #[test]
    fn test_assignable_excludes_inactive() {
        let chart = chart();
        assert_eq!(chart.assignable().count(), 3);
        assert!(chart.assignable().all(|a| a.active && a.analytical));
    }

    #[test]
    fn test_suggest_code() {
        let chart = chart();
        assert_eq!(chart.suggest_code(AccountType::Expense), "4.1.1.08");
        assert_eq!(chart.suggest_code(AccountType::Revenue), "3.1.1.02");
        assert_eq!(chart.suggest_code(AccountType::Liability), "2.1.1.01");
    }

    #[test]
    fn test_insert_rejects_duplicates_and_keeps_order() {
        let mut chart = chart();
        let result = chart.insert(account("4.1.1.01", AccountType::Expense, true, true));
        assert_eq!(result, Err(AccountError::DuplicateCode("4.1.1.01".into())));

        chart
            .insert(account("4.1.1.03", AccountType::Expense, true, true))
            .unwrap();
        let position = chart
            .accounts()
            .iter()
            .position(|a| a.code == "4.1.1.03")
            .unwrap();
        assert_eq!(chart.accounts()[position - 1].code, "4.1.1.02");

        assert!(matches!(
            chart.insert(account("4.1", AccountType::Expense, true, true)),
            Err(AccountError::InvalidCode(_))
        ));
    }
}
