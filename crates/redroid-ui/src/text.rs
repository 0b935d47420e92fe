//! Lexical similarity between report phrases and on-screen text.
//!
//! The extraction pipeline's phrases ("the Settings icon") rarely match UI
//! text verbatim, so comparison happens over cleaned, stop-word-stripped
//! forms with Jaro-Winkler, taking the best of the literal and the
//! token-order-insensitive reading.

/// Filler words that carry no signal when matching a phrase to a widget.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "to", "with", "button", "of", "or",
];

/// Lowercase, drop stop words and quote characters, and normalize "+" to
/// its spoken form so "+ button" matches an "add" FAB.
pub fn clean_word(word: &str) -> String {
    word.to_lowercase()
        .replace(['"', '\'', '`'], "")
        .replace('+', "add")
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity in `[0, 1]` between a step's target phrase and one text surface.
///
/// Returns 0 when either side cleans to nothing; an exact phrase match is
/// exactly 1.0. Word order is forgiven by also comparing token-sorted forms.
pub fn word_similarity(a: &str, b: &str) -> f64 {
    let a = clean_word(a);
    let b = clean_word(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let literal = strsim::jaro_winkler(&a, &b);
    let sorted = strsim::jaro_winkler(&sorted_tokens(&a), &sorted_tokens(&b));
    literal.max(sorted)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
