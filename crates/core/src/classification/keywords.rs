//! Keyword extraction for rule learning.

use crate::text::normalize;

const STOPWORDS: [&str; 9] = [
    "para",
    "com",
    "por",
    "pix",
    "ted",
    "doc",
    "boleto",
    "pagamento",
    "recebimento",
];

const MAX_KEYWORDS: usize = 5;

/// Extracts up to five distinctive words from a description.
///
/// Lowercases, strips accents and punctuation, keeps words longer than
/// three characters that are not stopwords, in order of appearance.
#[must_use]
pub fn extract_keywords(description: &str) -> Vec<String> {
    let normalized = normalize(description);
    let mut keywords: Vec<String> = Vec::new();
    for word in normalized.split(' ') {
        if word.chars().count() <= 3 || STOPWORDS.contains(&word) {
            continue;
        }
        if keywords.iter().any(|k| k == word) {
            continue;
        }
        keywords.push(word.to_string());
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}
