//! Built-in description patterns for recurring movements.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::rules::RuleDirection;
use crate::text::fold_accents;
use crate::transaction::Direction;

/// A description pattern mapped to a standard account code.
#[derive(Debug)]
pub struct KnownPattern {
    /// Short label used in reasons.
    pub label: &'static str,
    /// Matched against the lowercased, accent-folded description.
    pub regex: Regex,
    /// Target account code.
    pub account_code: &'static str,
    /// Confidence, 0 to 1.
    pub confidence: Decimal,
    /// Movements the pattern applies to.
    pub direction: RuleDirection,
}

impl KnownPattern {
    /// Returns true if the pattern applies to the description and direction.
    #[must_use]
    pub fn matches(&self, description: &str, direction: Direction) -> bool {
        self.direction.accepts(direction)
            && self
                .regex
                .is_match(&fold_accents(&description.to_lowercase()))
    }
}

fn known(
    label: &'static str,
    pattern: &str,
    account_code: &'static str,
    confidence: i64,
    direction: RuleDirection,
) -> KnownPattern {
    KnownPattern {
        label,
        regex: Regex::new(pattern).expect("known pattern is valid"),
        account_code,
        confidence: Decimal::new(confidence, 2),
        direction,
    }
}

static KNOWN_PATTERNS: LazyLock<Vec<KnownPattern>> = LazyLock::new(|| {
    vec![
        known(
            "Despesas Bancárias",
            r"tarifa|taxa bancaria|\biof\b",
            "4.2.1.01",
            90,
            RuleDirection::Debit,
        ),
        known(
            "Juros e Multas",
            r"juros|multa",
            "4.2.1.02",
            85,
            RuleDirection::Debit,
        ),
        known(
            "Despesas com Pessoal",
            r"salario|folha|\binss\b|\bfgts\b|vale (transporte|alimentacao|refeicao)",
            "4.1.2.01",
            80,
            RuleDirection::Debit,
        ),
        known(
            "Pró-labore",
            r"pro-?labore",
            "4.1.2.02",
            95,
            RuleDirection::Debit,
        ),
        known(
            "Energia Elétrica",
            r"\benel\b|cemig|copel|energia|eletric",
            "4.1.1.01",
            90,
            RuleDirection::Debit,
        ),
        known(
            "Telefone e Internet",
            r"\b(vivo|tim|claro|oi)\b|internet|telefon",
            "4.1.1.02",
            85,
            RuleDirection::Debit,
        ),
        known(
            "Aluguel e Condomínio",
            r"aluguel|locacao|condominio",
            "4.1.1.03",
            85,
            RuleDirection::Debit,
        ),
        known(
            "Receita de Serviços",
            r"honorarios|nota fiscal|\bnfse\b|recebimento (de )?servico",
            "3.1.1.01",
            75,
            RuleDirection::Credit,
        ),
    ]
});

/// Returns the built-in patterns in priority order.
#[must_use]
pub fn known_patterns() -> &'static [KnownPattern] {
    &KNOWN_PATTERNS
}
