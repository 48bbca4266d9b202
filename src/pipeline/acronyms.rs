//! Acronym detection: token scan plus batch-level expansion inference.
//!
//! Two independent passes share this module:
//!
//! 1. **Token scan** (per page) — uppercase runs of 2–9 alphanumerics,
//!    slashes, and ampersands, optionally carrying a parenthesized uppercase
//!    suffix (`USD(R&E)`), excluding purely numeric tokens. Ordinary all-caps
//!    words (`NOTE`, `DRAFT`) match too; no disambiguation pass exists.
//!
//! 2. **Expansion scan** (per record, aggregated batch-wide) — recovers
//!    "Spelled Out Name (ACRONYM)" definitions. A pure capitalized-word regex
//!    misses phrases with lowercase connectors ("Joint All-Domain Command
//!    and Control (JADC2)"), so instead of matching the phrase directly we
//!    anchor on the parenthesized token and walk backwards through the
//!    preceding words, admitting capitalized words and a small connector set.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Acronym-looking token: bounded uppercase run, then an optional
/// parenthesized suffix. The suffix sits outside the word boundary because
/// `(` ends the word.
static RE_ACRONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][A-Z0-9/&]{1,8})\b(\([A-Z&/]+\))?").unwrap());

/// Parenthesized short uppercase token — the anchor for expansion scanning.
static RE_PAREN_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([A-Z][A-Z0-9/&]{1,8})\)").unwrap());

/// Lowercase words allowed inside an expansion phrase without breaking it.
const CONNECTORS: &[&str] = &["and", "of", "the", "for", "in", "on", "to", "a", "&"];

/// Maximum words in an expansion phrase.
const MAX_EXPANSION_WORDS: usize = 8;

/// Extract the distinct set of acronym tokens from raw text.
///
/// Tokens are returned sorted (a `BTreeSet`) so record output is stable.
/// The base token is 2–9 characters by construction; the explicit filters
/// guard the invariants directly: length ≥ 2 and not purely numeric.
pub fn extract_acronyms(text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for caps in RE_ACRONYM.captures_iter(text) {
        let base = &caps[1];
        if base.len() < 2 || base.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let token = match caps.get(2) {
            Some(suffix) => format!("{}{}", base, suffix.as_str()),
            None => base.to_string(),
        };
        found.insert(token);
    }
    found
}

/// Scan text for "expansion (ACRONYM)" definitions.
///
/// Returns one `(acronym, phrase)` pair per occurrence, duplicates included —
/// the caller counts frequencies batch-wide and picks the most common phrase
/// per acronym.
pub fn scan_expansions(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for caps in RE_PAREN_TOKEN.captures_iter(text) {
        let acronym = caps[1].to_string();
        let paren_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        if let Some(phrase) = phrase_before(&text[..paren_start]) {
            pairs.push((acronym, phrase));
        }
    }
    pairs
}

/// Walk backwards from a parenthesized token, collecting the capitalized
/// phrase that precedes it.
///
/// Accepts words starting with an uppercase letter and lowercase connector
/// words; stops at sentence punctuation or after [`MAX_EXPANSION_WORDS`].
/// Leading connectors are trimmed case-insensitively ("The Concept of
/// Operations" starts at "Concept") and phrases shorter than two words are
/// rejected.
fn phrase_before(prefix: &str) -> Option<String> {
    let mut collected: Vec<&str> = Vec::new();

    for word in prefix.split_whitespace().rev() {
        if collected.len() == MAX_EXPANSION_WORDS {
            break;
        }
        // Sentence punctuation ends the candidate phrase.
        if word
            .chars()
            .last()
            .is_some_and(|c| matches!(c, '.' | ';' | ':' | '!' | '?'))
        {
            break;
        }
        let trimmed = word.trim_end_matches(',');
        if trimmed.is_empty() {
            break;
        }
        let capitalized = trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase());
        if capitalized || CONNECTORS.contains(&trimmed) {
            collected.push(trimmed);
        } else {
            break;
        }
    }

    collected.reverse();

    // Trim leading connectors so "and Control (C2)" can't produce a phrase
    // starting with "and". Case-insensitive: a capitalized article ("The
    // Concept of Operations") is no more a phrase start than a lowercase one.
    let start = collected
        .iter()
        .position(|w| !CONNECTORS.contains(&w.to_lowercase().as_str()))?;
    let phrase: Vec<&str> = collected[start..].to_vec();

    if phrase.len() < 2 {
        return None;
    }
    Some(phrase.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_uppercase_and_bounded() {
        let found = extract_acronyms("DARPA briefed C4ISR and NC3 to the J6.");
        assert!(found.contains("DARPA"));
        assert!(found.contains("C4ISR"));
        assert!(found.contains("NC3"));
        assert!(found.contains("J6"));
        for token in &found {
            let base = token.split('(').next().unwrap();
            assert!(base.len() >= 2 && base.len() <= 9, "bad token: {token}");
            assert!(!base.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn single_letters_and_numbers_excluded() {
        let found = extract_acronyms("Plan A costs 2000 dollars in FY25");
        assert!(!found.contains("A"));
        assert!(!found.contains("2000"));
        assert!(found.contains("FY25"));
    }

    #[test]
    fn long_capital_runs_rejected() {
        let found = extract_acronyms("ABCDEFGHIJK is too long");
        assert!(found.is_empty());
    }

    #[test]
    fn parenthesized_suffix_kept() {
        let found = extract_acronyms("reports to USD(R&E) directly");
        assert!(found.contains("USD(R&E)"), "got: {found:?}");
    }

    #[test]
    fn tokens_deduplicated() {
        let found = extract_acronyms("DOD DOD DOD");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn expansion_with_lowercase_connectors() {
        let pairs = scan_expansions("Joint All-Domain Command and Control (JADC2) overview");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "JADC2");
        assert_eq!(pairs[0].1, "Joint All-Domain Command and Control");
    }

    #[test]
    fn expansion_stops_at_sentence_boundary() {
        let pairs = scan_expansions("End of intro. Missile Defense Agency (MDA) leads");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "Missile Defense Agency");
    }

    #[test]
    fn expansion_caps_phrase_length() {
        let text = "One Two Three Four Five Six Seven Eight Nine Ten (ACRO)";
        let pairs = scan_expansions(text);
        assert_eq!(pairs.len(), 1);
        let words: Vec<&str> = pairs[0].1.split(' ').collect();
        assert_eq!(words.len(), 8);
        assert_eq!(words[0], "Three");
    }

    #[test]
    fn single_word_expansion_rejected() {
        let pairs = scan_expansions("lowercase words then Control (C2)");
        assert!(pairs.is_empty());
    }

    #[test]
    fn leading_connectors_trimmed() {
        let pairs = scan_expansions("running and Mission Command (MC) cell");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "Mission Command");
    }

    #[test]
    fn capitalized_leading_article_trimmed() {
        let pairs = scan_expansions("The Concept of Operations (CONOPS) governs execution.");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "Concept of Operations");
    }
}
