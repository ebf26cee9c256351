//! Checks applied to every chosen account before a proposal is accepted.
//!
//! - Credits that are not income (partner money, loans, refunds, own
//!   transfers) may never be booked as revenue.
//! - Generic accounts need a written justification.
//! - Credits booked as expense and debits booked as revenue raise warnings.

use std::sync::LazyLock;

use regex::Regex;

use crate::account::{Account, AccountType, is_generic_code};
use crate::text::normalize;
use crate::transaction::{BankTransaction, Direction};

use super::error::ClassificationError;

static NOT_REVENUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(socios?|emprestimos?|aportes?|devolucao|devolucoes|reembolsos?|transferencia propria)\b",
    )
    .expect("not-revenue pattern is valid")
});

/// Stateless guard over account choices.
pub struct ClassificationGuard;

impl ClassificationGuard {
    /// Returns the keyword that makes a credit non-revenue, if any.
    #[must_use]
    pub fn forbidden_reason(transaction: &BankTransaction) -> Option<String> {
        if transaction.direction() != Direction::Credit {
            return None;
        }
        NOT_REVENUE
            .find(&normalize(&transaction.description))
            .map(|m| m.as_str().to_string())
    }

    /// Returns the reason `account` is forbidden for the transaction.
    #[must_use]
    pub fn blocked_reason(transaction: &BankTransaction, account: &Account) -> Option<String> {
        if account.account_type != AccountType::Revenue {
            return None;
        }
        Self::forbidden_reason(transaction)
            .map(|keyword| format!("'{keyword}' indicates the credit is not revenue"))
    }

    /// Validates an account choice and returns its warnings.
    ///
    /// # Errors
    ///
    /// - `NotRevenue` for a non-income credit booked as revenue
    /// - `JustificationRequired` for a generic account without a long
    ///   enough justification
    pub fn check(
        transaction: &BankTransaction,
        account: &Account,
        justification: Option<&str>,
        min_len: usize,
    ) -> Result<Vec<String>, ClassificationError> {
        if account.account_type == AccountType::Revenue
            && let Some(reason) = Self::forbidden_reason(transaction)
        {
            return Err(ClassificationError::NotRevenue { reason });
        }

        let mut warnings = direction_warnings(transaction, account);
        if is_generic_code(&account.code) {
            let long_enough =
                justification.is_some_and(|j| j.trim().chars().count() >= min_len);
            if !long_enough {
                return Err(ClassificationError::JustificationRequired {
                    code: account.code.clone(),
                    min_len,
                });
            }
            warnings.push(format!("Generic account {} used", account.code));
        }
        Ok(warnings)
    }

    /// Warnings shown next to a candidate before anything is proposed.
    #[must_use]
    pub fn warnings(transaction: &BankTransaction, account: &Account) -> Vec<String> {
        let mut warnings = direction_warnings(transaction, account);
        if is_generic_code(&account.code) {
            warnings.push(format!("Account {} needs a justification", account.code));
        }
        warnings
    }
}

fn direction_warnings(transaction: &BankTransaction, account: &Account) -> Vec<String> {
    match (transaction.direction(), account.account_type) {
        (Direction::Credit, AccountType::Expense) => {
            vec!["Credit classified as expense".to_string()]
        }
        (Direction::Debit, AccountType::Revenue) => {
            vec!["Debit classified as revenue".to_string()]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Nature;
    use crate::workflow::TransactionStatus;
    use chrono::{NaiveDate, Utc};
    use conciliar_shared::types::{AccountId, Amount, BankTransactionId, TenantId};
    use rstest::rstest;

    fn transaction(description: &str, amount: i64) -> BankTransaction {
        BankTransaction {
            id: BankTransactionId::new(),
            tenant_id: TenantId::new(),
            external_id: "F1".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            amount: Amount::from_minor(amount),
            description: description.into(),
            memo: None,
            reference: None,
            counterpart_id: None,
            status: TransactionStatus::Imported,
            imported_at: Utc::now(),
        }
    }

    fn account(code: &str, account_type: AccountType) -> Account {
        Account {
            id: AccountId::new(),
            tenant_id: TenantId::new(),
            code: code.into(),
            name: "Conta".into(),
            account_type,
            nature: Nature::Debit,
            analytical: true,
            active: true,
            parent_code: None,
        }
    }

    #[rstest]
    #[case("PIX RECEBIDO - APORTE SÓCIO JOÃO")]
    #[case("Empréstimo banco")]
    #[case("DEVOLUÇÃO COMPRA")]
    #[case("TRANSFERENCIA PROPRIA CC 1234")]
    fn test_non_income_credit_blocks_revenue(#[case] description: &str) {
        let tx = transaction(description, 100_000);
        let revenue = account("3.1.1.01", AccountType::Revenue);
        assert!(matches!(
            ClassificationGuard::check(&tx, &revenue, None, 10),
            Err(ClassificationError::NotRevenue { .. })
        ));
        assert!(ClassificationGuard::blocked_reason(&tx, &revenue).is_some());
        // Other account types stay allowed.
        let liability = account("2.1.1.05", AccountType::Liability);
        assert!(ClassificationGuard::check(&tx, &liability, None, 10).is_ok());
    }

    #[test]
    fn test_debit_with_keyword_is_not_blocked() {
        let tx = transaction("REEMBOLSO DESPESAS", -5_000);
        assert!(ClassificationGuard::forbidden_reason(&tx).is_none());
    }

    #[test]
    fn test_generic_account_needs_justification() {
        let tx = transaction("PIX DIVERSOS", -5_000);
        let generic = account("4.1.1.99", AccountType::Expense);
        assert!(matches!(
            ClassificationGuard::check(&tx, &generic, Some("curto"), 10),
            Err(ClassificationError::JustificationRequired { .. })
        ));
        let warnings =
            ClassificationGuard::check(&tx, &generic, Some("compra avulsa de material"), 10)
                .unwrap();
        assert_eq!(warnings, vec!["Generic account 4.1.1.99 used".to_string()]);
    }

    #[test]
    fn test_direction_warnings() {
        let credit = transaction("ESTORNO TARIFA", 1_000);
        let expense = account("4.2.1.01", AccountType::Expense);
        assert_eq!(
            ClassificationGuard::check(&credit, &expense, None, 10).unwrap(),
            vec!["Credit classified as expense".to_string()]
        );

        let debit = transaction("AJUSTE", -1_000);
        let revenue = account("3.1.1.01", AccountType::Revenue);
        assert_eq!(
            ClassificationGuard::check(&debit, &revenue, None, 10).unwrap(),
            vec!["Debit classified as revenue".to_string()]
        );
    }
}
