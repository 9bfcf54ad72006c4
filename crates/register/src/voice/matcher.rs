//! Phrase scoring for voice commands.

/// Minimum score for a fuzzy or containment candidate.
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Score when one string contains the other.
const CONTAINS_SCORE: f64 = 0.9;

/// Containment score for the primary phrase of a page command.
pub const PAGE_PRIMARY_SCORE: f64 = 0.95;

/// Containment score for every other phrase.
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Lowercase and trim a transcript or phrase.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Similarity between two strings in `0.0..=1.0`.
///
/// 0.9 when either contains the other. Otherwise the number of words of
/// `a` (longer than one character) that also occur in `b`, divided by the
/// larger word count. Words are compared whole; `product` and `products`
/// are different words.
#[must_use]
#[allow(clippy::cast_precision_loss)] // word counts are tiny
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return CONTAINS_SCORE;
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    let shared = words_a
        .iter()
        .filter(|word| word.chars().count() > 1 && words_b.contains(*word))
        .count();
    let longest = words_a.len().max(words_b.len());

    shared as f64 / longest as f64
}
