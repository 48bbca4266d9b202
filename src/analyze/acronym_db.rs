//! Frequency-sorted acronym database with inferred expansions.
//!
//! Counts come from the per-record acronym lists (one count per record the
//! acronym appears on, not per occurrence). Expansions come from re-scanning
//! each record's full text for "Full Name (ACRONYM)" patterns; when a record
//! defines an acronym several ways across the batch, the most common
//! expansion wins.

use crate::pipeline::acronyms::scan_expansions;
use crate::record::SlideRecord;
use std::collections::HashMap;

use super::{AcronymEntry, FrequencyCounter};

/// Acronyms kept in the database.
const MAX_ACRONYMS: usize = 500;

pub fn build_acronym_db(records: &[SlideRecord]) -> Vec<AcronymEntry> {
    let mut counts = FrequencyCounter::new();
    let mut expansions: HashMap<String, FrequencyCounter> = HashMap::new();

    for record in records {
        for acronym in &record.acronyms {
            counts.add(acronym.clone());
        }
        for (acronym, expansion) in scan_expansions(&record.full_text) {
            expansions.entry(acronym).or_default().add(expansion);
        }
    }

    counts
        .most_common(MAX_ACRONYMS)
        .into_iter()
        .map(|(acronym, count)| {
            let expansion = expansions
                .get(&acronym)
                .and_then(|c| c.most_common(1).into_iter().next())
                .map(|(phrase, _)| phrase);
            AcronymEntry {
                acronym,
                count,
                expansion,
            }
        })
        .collect()
}
