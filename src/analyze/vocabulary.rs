//! Frequency-weighted vocabulary, segmented by slide type.
//!
//! Two term sources feed the same counters: single words (alphabetic, length
//! ≥ 3, lowercased, stop words removed) and raw 2-/3-gram phrases from the
//! whitespace-split text. Phrases are intentionally NOT stop-word filtered —
//! "course of action" is exactly the kind of phrase worth keeping.
//!
//! Ranking truncates first and filters by minimum count second, so the output
//! can be shorter than the per-type cap even when more qualifying terms exist
//! further down the ranking.

use crate::config::CorpusConfig;
use crate::record::SlideRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::{FrequencyCounter, TermCount};

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("valid regex"));

/// Strips characters that make a phrase look like noise; keeps word chars,
/// whitespace, and the `/ & ( ) -` commonly found in programmatic names.
static RE_PHRASE_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s/&()-]").expect("valid regex"));

/// Minimum phrase length (chars) for an n-gram to be counted.
const MIN_PHRASE_CHARS: usize = 7;

/// Build per-type vocabulary lists plus the batch-wide `_overall` list.
pub fn build_vocabulary(
    records: &[SlideRecord],
    config: &CorpusConfig,
) -> BTreeMap<String, Vec<TermCount>> {
    let mut by_type: BTreeMap<String, FrequencyCounter> = BTreeMap::new();
    let mut overall = FrequencyCounter::new();

    for record in records {
        let counter = by_type
            .entry(record.slide_type.as_str().to_string())
            .or_default();

        for m in RE_WORD.find_iter(&record.full_text) {
            let word = m.as_str().to_lowercase();
            if config.stop_words.contains(&word) {
                continue;
            }
            counter.add(word.clone());
            overall.add(word);
        }

        for phrase in ngram_phrases(&record.full_text) {
            counter.add(phrase.clone());
            overall.add(phrase);
        }
    }

    let mut result: BTreeMap<String, Vec<TermCount>> = by_type
        .into_iter()
        .map(|(slide_type, counter)| {
            let terms = to_term_counts(
                &counter,
                config.max_terms_per_type,
                config.min_term_count,
            );
            (slide_type, terms)
        })
        .collect();

    result.insert(
        "_overall".to_string(),
        to_term_counts(&overall, config.max_overall_terms, config.min_overall_count),
    );
    result
}

/// Cleaned, lowercased 2- and 3-grams over the whitespace-split text.
fn ngram_phrases(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut phrases = Vec::new();
    for n in [2usize, 3] {
        if words.len() < n {
            continue;
        }
        for window in words.windows(n) {
            let phrase = window.join(" ");
            if phrase.chars().count() < MIN_PHRASE_CHARS
                || phrase.chars().next().is_some_and(|c| c.is_ascii_digit())
            {
                continue;
            }
            let cleaned = RE_PHRASE_NOISE.replace_all(&phrase, "");
            let cleaned = cleaned.trim();
            if !cleaned.is_empty() {
                phrases.push(cleaned.to_lowercase());
            }
        }
    }
    phrases
}

fn to_term_counts(counter: &FrequencyCounter, cap: usize, min_count: u64) -> Vec<TermCount> {
    counter
        .most_common(cap)
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .map(|(term, count)| TermCount { term, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SlideType;

    fn record(slide_type: SlideType, text: &str) -> SlideRecord {
        SlideRecord {
            source_file: "deck.pdf".into(),
            page_num: 0,
            slide_type,
            title: String::new(),
            full_text: text.into(),
            text_blocks: vec![],
            colors: vec![],
            acronyms: vec![],
            num_text_blocks: 1,
            page_width: 720.0,
            page_height: 540.0,
        }
    }

    fn test_config() -> CorpusConfig {
        CorpusConfig::builder()
            .min_term_count(1)
            .min_overall_count(1)
            .build()
            .unwrap()
    }

    #[test]
    fn words_are_lowercased_and_stop_filtered() {
        let records = vec![record(SlideType::Bullets, "The Mission drives the Mission")];
        let vocab = build_vocabulary(&records, &test_config());
        let bullets = &vocab["bullets"];
        let mission = bullets.iter().find(|t| t.term == "mission").unwrap();
        assert_eq!(mission.count, 2);
        assert!(bullets.iter().all(|t| t.term != "the"));
    }

    #[test]
    fn short_words_excluded() {
        let records = vec![record(SlideType::Bullets, "AI ML ops readiness")];
        let vocab = build_vocabulary(&records, &test_config());
        let bullets = &vocab["bullets"];
        assert!(bullets.iter().all(|t| t.term != "ai" && t.term != "ml"));
        assert!(bullets.iter().any(|t| t.term == "ops"));
        assert!(bullets.iter().any(|t| t.term == "readiness"));
    }

    #[test]
    fn phrases_counted_alongside_words() {
        let records = vec![record(SlideType::Bullets, "course of action review")];
        let vocab = build_vocabulary(&records, &test_config());
        let bullets = &vocab["bullets"];
        assert!(bullets.iter().any(|t| t.term == "course of action"));
        assert!(bullets.iter().any(|t| t.term == "of action review"));
    }

    #[test]
    fn digit_led_and_short_phrases_skipped() {
        let phrases = ngram_phrases("2024 budget growth");
        assert!(phrases.iter().all(|p| !p.starts_with("2024")));
        // "budget growth" survives; short grams like "a b" would not
        assert!(phrases.contains(&"budget growth".to_string()));
        assert!(ngram_phrases("a b c").is_empty());
    }

    #[test]
    fn phrase_punctuation_stripped() {
        let phrases = ngram_phrases("readiness, posture!");
        assert!(phrases.contains(&"readiness posture".to_string()));
    }

    #[test]
    fn min_count_filter_applies_after_truncation() {
        let config = CorpusConfig::builder()
            .min_term_count(2)
            .min_overall_count(3)
            .build()
            .unwrap();
        let records = vec![
            record(SlideType::Bullets, "logistics logistics sustainment"),
            record(SlideType::Bullets, "logistics"),
        ];
        let vocab = build_vocabulary(&records, &config);
        let bullets = &vocab["bullets"];
        assert!(bullets.iter().any(|t| t.term == "logistics" && t.count == 3));
        assert!(bullets.iter().all(|t| t.term != "sustainment"));
        let overall = &vocab["_overall"];
        assert!(overall.iter().any(|t| t.term == "logistics"));
    }

    #[test]
    fn overall_sums_across_types() {
        let records = vec![
            record(SlideType::Title, "readiness"),
            record(SlideType::Bullets, "readiness"),
        ];
        let vocab = build_vocabulary(&records, &test_config());
        let overall = &vocab["_overall"];
        assert!(overall.iter().any(|t| t.term == "readiness" && t.count == 2));
    }
}
