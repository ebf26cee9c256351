//! Settlement report: statement credits against a boleto listing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{Amount, BankTransactionId};

use super::types::BoletoGroup;
use crate::import::MemoKind;
use crate::transaction::BankTransaction;

/// Outcome of one settlement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Credit and listing agree to the cent.
    Reconciled,
    /// Reference and date agree but the amounts differ.
    Divergent,
    /// Settlement credit with no listing group.
    MissingBoleto,
    /// Listing group inside the statement period with no credit.
    MissingStatement,
}

/// One line of the settlement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Settlement reference.
    pub reference: String,
    /// Statement date (transaction date, or listing date when missing).
    pub date: NaiveDate,
    /// The settlement credit, if any.
    pub transaction_id: Option<BankTransactionId>,
    /// Amount credited on the statement.
    pub credited: Amount,
    /// Amount received according to the listing.
    pub listed: Amount,
    /// `credited - listed`.
    pub difference: Amount,
    /// Fees charged for this reference (positive).
    pub fees: Amount,
    /// `credited - fees`.
    pub net: Amount,
    /// Number of boletos in the group.
    pub boleto_count: usize,
    /// Status of the batch.
    pub status: ReportStatus,
    /// Fee transactions tied to the reference.
    pub fee_transactions: Vec<BankTransactionId>,
}

/// Settlement report for a statement period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Statement period, when known.
    pub period: Option<(NaiveDate, NaiveDate)>,
    /// Report lines: credits first in date order, then missing credits.
    pub entries: Vec<ReportEntry>,
    /// Total of settlement credits on the statement.
    pub total_credited: Amount,
    /// Total received according to the listing.
    pub total_listed: Amount,
    /// Total of settlement and maintenance fees (positive).
    pub total_fees: Amount,
    /// Total of incoming PIX (not part of settlements).
    pub total_pix: Amount,
}

impl ReconciliationReport {
    /// Builds the report.
    ///
    /// Each settlement credit is looked up among the groups sharing its
    /// reference whose statement date lies within `window_days`. Groups not
    /// consumed and dated inside `period` are reported as missing credits;
    /// groups outside the period belong to another statement.
    #[must_use]
    pub fn build(
        transactions: &[BankTransaction],
        groups: &[BoletoGroup],
        period: Option<(NaiveDate, NaiveDate)>,
        window_days: i64,
    ) -> Self {
        let classified: Vec<_> = transactions.iter().map(|t| (t, t.memo_info())).collect();
        let mut consumed = vec![false; groups.len()];
        let mut entries = Vec::new();

        let mut receipts: Vec<_> = classified
            .iter()
            .filter(|(_, info)| info.kind == MemoKind::BoletoReceipt)
            .filter_map(|(t, info)| Some((*t, info.reference.clone()?)))
            .collect();
        receipts.sort_by_key(|(t, _)| t.date);

        for (transaction, reference) in receipts {
            let fee_transactions: Vec<&BankTransaction> = classified
                .iter()
                .filter(|(_, info)| {
                    matches!(info.kind, MemoKind::SettlementFee | MemoKind::MaintenanceFee)
                        && info.reference.as_deref() == Some(reference.as_str())
                })
                .map(|(t, _)| *t)
                .collect();
            let fees: Amount = fee_transactions.iter().map(|t| t.amount.abs()).sum();

            let group = groups.iter().enumerate().find(|(index, g)| {
                !consumed[*index]
                    && g.document == reference
                    && g.statement_date
                        .is_some_and(|d| (d - transaction.date).num_days().abs() <= window_days)
            });

            let (listed, boleto_count, status) = match group {
                Some((index, group)) => {
                    consumed[index] = true;
                    let listed = group.total_received();
                    let status = if listed == transaction.amount {
                        ReportStatus::Reconciled
                    } else {
                        ReportStatus::Divergent
                    };
                    (listed, group.boletos.len(), status)
                }
                None => (Amount::ZERO, 0, ReportStatus::MissingBoleto),
            };

            entries.push(ReportEntry {
                reference,
                date: transaction.date,
                transaction_id: Some(transaction.id),
                credited: transaction.amount,
                listed,
                difference: transaction.amount - listed,
                fees,
                net: transaction.amount - fees,
                boleto_count,
                status,
                fee_transactions: fee_transactions.iter().map(|t| t.id).collect(),
            });
        }

        for (index, group) in groups.iter().enumerate() {
            if consumed[index] {
                continue;
            }
            let Some(date) = group.statement_date else {
                continue;
            };
            let inside = period.is_some_and(|(start, end)| start <= date && date <= end);
            if !inside {
                continue;
            }
            let listed = group.total_received();
            entries.push(ReportEntry {
                reference: group.document.clone(),
                date,
                transaction_id: None,
                credited: Amount::ZERO,
                listed,
                difference: -listed,
                fees: Amount::ZERO,
                net: Amount::ZERO,
                boleto_count: group.boletos.len(),
                status: ReportStatus::MissingStatement,
                fee_transactions: Vec::new(),
            });
        }

        let total_credited = classified
            .iter()
            .filter(|(_, info)| info.kind == MemoKind::BoletoReceipt)
            .map(|(t, _)| t.amount)
            .sum();
        let total_fees = classified
            .iter()
            .filter(|(_, info)| matches!(info.kind, MemoKind::SettlementFee | MemoKind::MaintenanceFee))
            .map(|(t, _)| t.amount.abs())
            .sum();
        let total_pix = classified
            .iter()
            .filter(|(_, info)| info.kind == MemoKind::PixReceipt)
            .map(|(t, _)| t.amount)
            .sum();

        Self {
            period,
            entries,
            total_credited,
            total_listed: groups.iter().map(BoletoGroup::total_received).sum(),
            total_fees,
            total_pix,
        }
    }

    /// Number of entries with the given status.
    #[must_use]
    pub fn count(&self, status: ReportStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}
