//! Slide-type distribution and common-title extraction.

use crate::record::SlideRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::{FrequencyCounter, TitleCount, TypeShare};

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static RE_TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[:\-–—]+$").expect("valid regex"));

/// Titles must repeat at least this often to count as "common".
const MIN_TITLE_COUNT: u64 = 2;

/// Count slides per type, with each type's share of the batch as a
/// percentage rounded to one decimal. Empty batch yields an empty map.
pub fn type_distribution(records: &[SlideRecord]) -> BTreeMap<String, TypeShare> {
    let mut counts = FrequencyCounter::new();
    for record in records {
        counts.add(record.slide_type.as_str());
    }
    let total = records.len() as f64;
    if total == 0.0 {
        return BTreeMap::new();
    }

    counts
        .most_common(usize::MAX)
        .into_iter()
        .map(|(slide_type, count)| {
            let percentage = (count as f64 / total * 1000.0).round() / 10.0;
            (slide_type, TypeShare { count, percentage })
        })
        .collect()
}

/// The most common normalized titles across the batch.
///
/// Normalization uppercases, collapses runs of whitespace, and strips
/// trailing colon/dash punctuation so "Agenda:" and "AGENDA" count as one
/// title. Titles of 3 chars or fewer are ignored.
pub fn common_titles(records: &[SlideRecord], top_n: usize) -> Vec<TitleCount> {
    let mut counts = FrequencyCounter::new();
    for record in records {
        let title = record.title.trim();
        if title.chars().count() <= 3 {
            continue;
        }
        if let Some(normalized) = normalize_title(title) {
            counts.add(normalized);
        }
    }

    counts
        .most_common(top_n)
        .into_iter()
        .filter(|(_, count)| *count >= MIN_TITLE_COUNT)
        .map(|(title, count)| TitleCount { title, count })
        .collect()
}

fn normalize_title(title: &str) -> Option<String> {
    let upper = title.to_uppercase();
    let collapsed = RE_WHITESPACE.replace_all(upper.trim(), " ");
    let stripped = RE_TRAILING_PUNCT.replace(&collapsed, "");
    let normalized = stripped.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}
