//! Split validation and line construction.

use serde::{Deserialize, Serialize};

use conciliar_shared::types::{AccountId, Amount, BankTransactionId, ProposalId, SplitLineId};

use super::error::SplitError;
use crate::account::ChartOfAccounts;
use crate::transaction::BankTransaction;
use crate::workflow::ProposedLine;

/// One recorded line of a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLine {
    /// Unique identifier.
    pub id: SplitLineId,
    /// Split transaction.
    pub transaction_id: BankTransactionId,
    /// Proposal that carries the split.
    pub proposal_id: ProposalId,
    /// Target account.
    pub account_id: AccountId,
    /// Signed amount.
    pub amount: Amount,
    /// Order within the split, starting at 1.
    pub position: u32,
    /// Optional line memo.
    pub memo: Option<String>,
}

/// Stateless split validator.
pub struct SplitEngine;

impl SplitEngine {
    /// Validates a split and builds its ordered lines.
    ///
    /// The lines must add up to the transaction amount exactly; there is no
    /// rounding tolerance. Nothing is recorded here; callers replace the
    /// stored split atomically with the returned lines.
    ///
    /// # Errors
    ///
    /// - `JustificationTooShort` if the justification is shorter than `min_len`
    /// - `Empty` if there are no lines
    /// - `ZeroLine` or `SignMismatch` for a malformed line
    /// - `Account` if a line account is unknown, inactive or synthetic
    /// - `SumMismatch` if the total differs from the transaction amount
    pub fn validate(
        transaction: &BankTransaction,
        proposal_id: ProposalId,
        lines: &[ProposedLine],
        chart: &ChartOfAccounts,
        justification: Option<&str>,
        min_len: usize,
    ) -> Result<Vec<SplitLine>, SplitError> {
        if justification.is_none_or(|j| j.trim().chars().count() < min_len) {
            return Err(SplitError::JustificationTooShort { min_len });
        }
        if lines.is_empty() {
            return Err(SplitError::Empty);
        }

        for (index, line) in lines.iter().enumerate() {
            let position = index + 1;
            if line.amount.is_zero() {
                return Err(SplitError::ZeroLine { position });
            }
            if line.amount.is_negative() != transaction.amount.is_negative() {
                return Err(SplitError::SignMismatch {
                    position,
                    amount: line.amount,
                });
            }
            chart
                .require_assignable(line.account_id)
                .map_err(|source| SplitError::Account { position, source })?;
        }

        let actual =
            Amount::checked_sum(lines.iter().map(|l| l.amount)).ok_or(SplitError::Overflow)?;
        if actual != transaction.amount {
            return Err(SplitError::SumMismatch {
                expected: transaction.amount,
                actual,
                difference: transaction.amount - actual,
            });
        }

        Ok(lines
            .iter()
            .zip(1u32..)
            .map(|(line, position)| SplitLine {
                id: SplitLineId::new(),
                transaction_id: transaction.id,
                proposal_id,
                account_id: line.account_id,
                amount: line.amount,
                position,
                memo: line.memo.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::account::{Account, AccountType};
    use crate::workflow::TransactionStatus;
    use chrono::{NaiveDate, Utc};
    use conciliar_shared::types::TenantId;

    pub(crate) const JUSTIFICATION: &str = "rateio entre centros de custo";

    pub(crate) fn chart() -> ChartOfAccounts {
        let account = |code: &str, active: bool| Account {
            id: AccountId::new(),
            tenant_id: TenantId::new(),
            code: code.into(),
            name: format!("Conta {code}"),
            account_type: AccountType::Expense,
            nature: AccountType::Expense.default_nature(),
            analytical: true,
            active,
            parent_code: None,
        };
        ChartOfAccounts::new(vec![
            account("4.1.1.01", true),
            account("4.1.1.02", true),
            account("4.1.1.03", true),
            account("4.1.1.07", false),
        ])
    }

    pub(crate) fn transaction(amount: i64) -> BankTransaction {
        BankTransaction {
            id: BankTransactionId::new(),
            tenant_id: TenantId::new(),
            external_id: "F9".into(),
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            amount: Amount::from_minor(amount),
            description: "PIX FORNECEDORES".into(),
            memo: None,
            reference: None,
            counterpart_id: None,
            status: TransactionStatus::Imported,
            imported_at: Utc::now(),
        }
    }

    fn lines(chart: &ChartOfAccounts, amounts: &[i64]) -> Vec<ProposedLine> {
        let codes = ["4.1.1.01", "4.1.1.02", "4.1.1.03"];
        amounts
            .iter()
            .zip(codes)
            .map(|(amount, code)| {
                ProposedLine::new(chart.by_code(code).unwrap().id, Amount::from_minor(*amount))
            })
            .collect()
    }

    #[test]
    fn test_exact_split_accepted() {
        let chart = chart();
        let tx = transaction(1_000);
        let split = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &lines(&chart, &[400, 350, 250]),
            &chart,
            Some(JUSTIFICATION),
            10,
        )
        .unwrap();
        assert_eq!(split.len(), 3);
        assert_eq!(split.iter().map(|l| l.position).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(split.iter().map(|l| l.amount).sum::<Amount>(), tx.amount);
    }

    #[test]
    fn test_one_cent_short_rejected() {
        let chart = chart();
        let tx = transaction(1_000);
        let result = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &lines(&chart, &[400, 350, 249]),
            &chart,
            Some(JUSTIFICATION),
            10,
        );
        let err = result.unwrap_err();
        assert_eq!(
            err,
            SplitError::SumMismatch {
                expected: Amount::from_minor(1_000),
                actual: Amount::from_minor(999),
                difference: Amount::from_minor(1),
            }
        );
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_empty_split_rejected() {
        let chart = chart();
        let tx = transaction(1_000);
        assert_eq!(
            SplitEngine::validate(&tx, ProposalId::new(), &[], &chart, Some(JUSTIFICATION), 10),
            Err(SplitError::Empty)
        );
    }

    #[test]
    fn test_inactive_account_rejected() {
        let chart = chart();
        let tx = transaction(-1_000);
        let inactive = chart.by_code("4.1.1.07").unwrap().id;
        let result = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &[ProposedLine::new(inactive, Amount::from_minor(-1_000))],
            &chart,
            Some(JUSTIFICATION),
            10,
        );
        assert!(matches!(result, Err(SplitError::Account { position: 1, .. })));
    }

    #[test]
    fn test_sign_and_zero_lines_rejected() {
        let chart = chart();
        let tx = transaction(-1_000);
        let result = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &lines(&chart, &[-1_200, 200]),
            &chart,
            Some(JUSTIFICATION),
            10,
        );
        assert!(matches!(result, Err(SplitError::SignMismatch { position: 2, .. })));

        let result = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &lines(&chart, &[-1_000, 0]),
            &chart,
            Some(JUSTIFICATION),
            10,
        );
        assert_eq!(result, Err(SplitError::ZeroLine { position: 2 }));
    }

    #[test]
    fn test_short_justification_rejected() {
        let chart = chart();
        let tx = transaction(1_000);
        let result = SplitEngine::validate(
            &tx,
            ProposalId::new(),
            &lines(&chart, &[1_000]),
            &chart,
            Some("curto"),
            10,
        );
        assert_eq!(result, Err(SplitError::JustificationTooShort { min_len: 10 }));
    }
}
