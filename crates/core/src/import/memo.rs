//! Statement memo classification.
//!
//! Cooperative banks encode the nature of a movement in the memo text
//! (`LIQ.COBRANCA SIMPLES-COB000123`). Recognizing it lets the matcher pair
//! boleto settlements with their listing and tie fees to the settlement.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of movement recognized from a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoKind {
    /// Settlement of a batch of issued boletos.
    BoletoReceipt,
    /// Incoming PIX.
    PixReceipt,
    /// Outgoing PIX.
    PixPayment,
    /// Payment of a third-party boleto.
    BoletoPayment,
    /// Utility or agreement debit.
    UtilityDebit,
    /// Fee charged for a boleto settlement.
    SettlementFee,
    /// Fee charged for title maintenance.
    MaintenanceFee,
    /// Monthly relationship package fee.
    PackageFee,
    /// Anything else.
    Other,
}

impl MemoKind {
    /// Returns true for bank fee kinds.
    #[must_use]
    pub fn is_fee(&self) -> bool {
        matches!(
            self,
            Self::SettlementFee | Self::MaintenanceFee | Self::PackageFee
        )
    }
}

/// Result of classifying a memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoInfo {
    /// Recognized kind.
    pub kind: MemoKind,
    /// Settlement reference, normalized to `COBnnnnnn`.
    pub reference: Option<String>,
    /// Counterpart document (CPF/CNPJ or PIX key).
    pub document: Option<String>,
    /// Counterpart name.
    pub counterpart: Option<String>,
}

struct MemoPattern {
    kind: MemoKind,
    regex: Regex,
}

fn pattern(kind: MemoKind, source: &str) -> MemoPattern {
    MemoPattern {
        kind,
        regex: Regex::new(source).expect("memo pattern is valid"),
    }
}

static PATTERNS: LazyLock<Vec<MemoPattern>> = LazyLock::new(|| {
    vec![
        pattern(MemoKind::BoletoReceipt, r"(?i)LIQ\.COBRANCA SIMPLES-COB(\d{6})"),
        pattern(MemoKind::PixReceipt, r"(?i)RECEBIMENTO PIX-PIX_CRED\s+(\S+)\s+(.*)"),
        pattern(MemoKind::PixPayment, r"(?i)PAGAMENTO PIX-PIX_DEB\s+(\S+)\s+(.*)"),
        pattern(MemoKind::BoletoPayment, r"(?i)LIQUIDACAO BOLETO-\s*(\d{11,14})\s+(.*)"),
        pattern(
            MemoKind::UtilityDebit,
            r"(?i)DEBITO CONVENIOS-(\S+)\s*(\d{11,14})?\s*(.*)",
        ),
        pattern(MemoKind::SettlementFee, r"(?i)TARIFA COM R LIQUIDACAO-COB(\d{6})"),
        pattern(MemoKind::MaintenanceFee, r"(?i)MANUTENCAO DE TITULOS-COB(\d{6})"),
        pattern(MemoKind::PackageFee, r"(?i)CESTA DE RELACIONAMENTO"),
    ]
});

static LOOSE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bC?OB(\d{6})\b").expect("reference pattern is valid"));

fn non_empty(value: Option<regex::Match<'_>>) -> Option<String> {
    value
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

impl MemoInfo {
    /// Classifies a memo. Unknown memos still yield a loose `COB` reference
    /// when one is present.
    #[must_use]
    pub fn classify(memo: &str) -> Self {
        let memo = memo.trim();
        for pattern in PATTERNS.iter() {
            let Some(caps) = pattern.regex.captures(memo) else {
                continue;
            };
            let info = match pattern.kind {
                MemoKind::BoletoReceipt | MemoKind::SettlementFee | MemoKind::MaintenanceFee => {
                    Self {
                        kind: pattern.kind,
                        reference: caps.get(1).map(|m| format!("COB{}", m.as_str())),
                        document: None,
                        counterpart: None,
                    }
                }
                MemoKind::PixReceipt | MemoKind::PixPayment | MemoKind::BoletoPayment => Self {
                    kind: pattern.kind,
                    reference: None,
                    document: non_empty(caps.get(1)),
                    counterpart: non_empty(caps.get(2)),
                },
                MemoKind::UtilityDebit => Self {
                    kind: pattern.kind,
                    reference: None,
                    document: non_empty(caps.get(2)),
                    counterpart: non_empty(caps.get(1)),
                },
                MemoKind::PackageFee | MemoKind::Other => Self::other(pattern.kind),
            };
            return info;
        }

        let mut info = Self::other(MemoKind::Other);
        info.reference = LOOSE_REFERENCE
            .captures(memo)
            .and_then(|caps| caps.get(1))
            .map(|m| format!("COB{}", m.as_str()));
        info
    }

    fn other(kind: MemoKind) -> Self {
        Self {
            kind,
            reference: None,
            document: None,
            counterpart: None,
        }
    }
}
