//! Representative sample text per slide type, for few-shot prompting.
//!
//! Very short slides carry no style signal and very long ones blow prompt
//! budgets, so only medium-length slides (50..=1500 chars of trimmed text)
//! qualify. Selection shuffles each type's candidates and keeps the first
//! `samples_per_type`, so a seeded run picks the same samples.

use crate::record::{truncate_chars, SlideRecord};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use super::SampleText;

const MIN_TEXT_CHARS: usize = 50;
const MAX_TEXT_CHARS: usize = 1500;
const SAMPLE_TITLE_CAP: usize = 200;
const SAMPLE_TEXT_CAP: usize = 1000;

pub fn collect_samples<R: Rng + ?Sized>(
    records: &[SlideRecord],
    samples_per_type: usize,
    rng: &mut R,
) -> BTreeMap<String, Vec<SampleText>> {
    let mut by_type: BTreeMap<String, Vec<SampleText>> = BTreeMap::new();

    for record in records {
        let text = record.full_text.trim();
        let len = text.chars().count();
        if !(MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&len) {
            continue;
        }
        by_type
            .entry(record.slide_type.as_str().to_string())
            .or_default()
            .push(SampleText {
                title: truncate_chars(record.title.trim(), SAMPLE_TITLE_CAP),
                text: truncate_chars(text, SAMPLE_TEXT_CAP),
                num_blocks: record.num_text_blocks,
            });
    }

    for samples in by_type.values_mut() {
        samples.shuffle(rng);
        samples.truncate(samples_per_type);
    }
    by_type
}
