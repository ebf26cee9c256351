//! Fuzzy comparison of party names.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::text::normalize;

/// Minimum word overlap for two names to be considered the same party.
pub const NAME_SIMILARITY_THRESHOLD: Decimal = Decimal::from_parts(6, 0, 0, false, 1);

const COMPANY_SUFFIXES: [&str; 5] = ["ltda", "eireli", "me", "epp", "sa"];

/// Lowercases, strips accents and punctuation and drops company suffixes.
#[must_use]
pub fn normalize_party_name(name: &str) -> String {
    let without_sa = name.to_lowercase().replace("s/a", " ");
    normalize(&without_sa)
        .split(' ')
        .filter(|word| !word.is_empty() && !COMPANY_SUFFIXES.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word-set overlap of two names: shared words over the larger set.
///
/// Returns zero when either name is empty after normalization.
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> Decimal {
    let a = normalize_party_name(a);
    let b = normalize_party_name(b);
    let words_a: BTreeSet<&str> = a.split(' ').filter(|w| !w.is_empty()).collect();
    let words_b: BTreeSet<&str> = b.split(' ').filter(|w| !w.is_empty()).collect();
    let larger = words_a.len().max(words_b.len());
    if words_a.is_empty() || words_b.is_empty() {
        return Decimal::ZERO;
    }
    let shared = words_a.intersection(&words_b).count();
    Decimal::from(shared) / Decimal::from(larger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_drops_suffixes() {
        assert_eq!(normalize_party_name("ACME Comércio LTDA"), "acme comercio");
        assert_eq!(normalize_party_name("Beta S/A"), "beta");
        assert_eq!(normalize_party_name("Gama Serviços - ME"), "gama servicos");
    }

    #[test]
    fn test_similarity() {
        assert_eq!(name_similarity("ACME COMERCIO LTDA", "Acme Comércio"), dec!(1));
        assert_eq!(name_similarity("JOAO DA SILVA", "JOAO SILVA"), dec!(2) / dec!(3));
        assert_eq!(name_similarity("", "X"), Decimal::ZERO);
        assert!(name_similarity("JOAO DA SILVA", "MARIA SOUZA") < NAME_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_threshold_value() {
        assert_eq!(NAME_SIMILARITY_THRESHOLD, dec!(0.6));
    }
}
