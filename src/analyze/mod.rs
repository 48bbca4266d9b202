//! Batch aggregation: five independent reductions over the full record batch.
//!
//! Aggregation is a strict reduction — it must observe the complete batch
//! before producing anything, because vocabulary ranking, palette grouping,
//! and title ranking all depend on batch-wide frequency counts. None of the
//! five algorithms may fail on an empty batch; each degrades to a well-formed
//! empty structure.
//!
//! "Most common" is deterministic everywhere: one [`FrequencyCounter`] type
//! ranks by count descending with ties broken by first-seen insertion order,
//! so a seeded run reproduces its corpus byte for byte.

pub mod acronym_db;
pub mod distribution;
pub mod palettes;
pub mod samples;
pub mod vocabulary;

use crate::config::CorpusConfig;
use crate::record::SlideRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::info;

// ── Frequency counting ───────────────────────────────────────────────────

/// An insertion-ordered frequency counter.
///
/// Ranking sorts by count descending, then by first-seen order, which makes
/// tie-breaks reproducible across runs regardless of hash-map iteration
/// order.
#[derive(Debug, Default, Clone)]
pub struct FrequencyCounter {
    counts: HashMap<String, u64>,
    order: Vec<String>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `key` by one.
    pub fn add(&mut self, key: impl Into<String>) {
        self.add_n(key, 1);
    }

    /// Increment `key` by `n`.
    pub fn add_n(&mut self, key: impl Into<String>, n: u64) {
        let key = key.into();
        match self.counts.get_mut(&key) {
            Some(count) => *count += n,
            None => {
                self.counts.insert(key.clone(), n);
                self.order.push(key);
            }
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` highest-count entries; ties keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(usize, &String)> = self.order.iter().enumerate().collect();
        ranked.sort_by(|(ia, ka), (ib, kb)| {
            self.counts[*kb].cmp(&self.counts[*ka]).then(ia.cmp(ib))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|(_, k)| (k.clone(), self.counts[k]))
            .collect()
    }
}

// ── Result types ─────────────────────────────────────────────────────────

/// A vocabulary term with its batch-wide count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// One acronym with its count and, when observed, its best expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymEntry {
    pub acronym: String,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<String>,
}

/// A representative colour palette tagged by slide type (`_overall` for the
/// synthetic batch-wide entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub slide_type: String,
    pub colors: Vec<String>,
}

/// A curated sample slide for few-shot use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleText {
    pub title: String,
    pub text: String,
    pub num_blocks: usize,
}

/// Count and share of one slide type within the batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    pub count: u64,
    pub percentage: f64,
}

/// A normalized title with its batch-wide count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCount {
    pub title: String,
    pub count: u64,
}

/// Batch-level summary numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_slides: usize,
    pub unique_sources: usize,
}

/// The aggregate of one analysis run. All fields are derived and recomputed
/// wholesale each run — there are no incremental-update semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Per-slide-type term lists plus the `_overall` key.
    pub vocabulary: BTreeMap<String, Vec<TermCount>>,
    pub acronyms: Vec<AcronymEntry>,
    pub palettes: Vec<Palette>,
    pub sample_text: BTreeMap<String, Vec<SampleText>>,
    pub type_distribution: BTreeMap<String, TypeShare>,
    pub common_titles: Vec<TitleCount>,
    pub stats: CorpusStats,
}

// ── Analyzer ─────────────────────────────────────────────────────────────

/// Runs the five aggregation algorithms over a record batch.
pub struct CorpusAnalyzer<'a> {
    config: &'a CorpusConfig,
}

impl<'a> CorpusAnalyzer<'a> {
    pub fn new(config: &'a CorpusConfig) -> Self {
        Self { config }
    }

    /// Analyze the full batch. Total for any input, including the empty
    /// batch. The RNG drives palette sampling and sample-text shuffling;
    /// seed it for reproducible corpora.
    pub fn analyze<R: Rng + ?Sized>(
        &self,
        records: &[SlideRecord],
        rng: &mut R,
    ) -> AnalysisResult {
        info!("Analyzing {} slides", records.len());

        let vocabulary = vocabulary::build_vocabulary(records, self.config);
        let acronyms = acronym_db::build_acronym_db(records);
        let palettes = palettes::build_palettes(records, rng);
        let sample_text = samples::collect_samples(records, self.config.samples_per_type, rng);
        let type_distribution = distribution::type_distribution(records);
        let common_titles = distribution::common_titles(records, self.config.max_titles);

        let unique_sources: HashSet<&str> =
            records.iter().map(|r| r.source_file.as_str()).collect();

        AnalysisResult {
            vocabulary,
            acronyms,
            palettes,
            sample_text,
            type_distribution,
            common_titles,
            stats: CorpusStats {
                total_slides: records.len(),
                unique_sources: unique_sources.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn counter_ranks_by_count_then_first_seen() {
        let mut c = FrequencyCounter::new();
        c.add("beta");
        c.add("alpha");
        c.add("alpha");
        c.add("gamma"); // same count as beta, seen later
        let ranked = c.most_common(10);
        assert_eq!(
            ranked,
            vec![
                ("alpha".to_string(), 2),
                ("beta".to_string(), 1),
                ("gamma".to_string(), 1),
            ]
        );
    }

    #[test]
    fn counter_truncates() {
        let mut c = FrequencyCounter::new();
        for word in ["a", "b", "c", "d"] {
            c.add(word);
        }
        assert_eq!(c.most_common(2).len(), 2);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn counter_add_n_merges() {
        let mut c = FrequencyCounter::new();
        c.add_n("x", 3);
        c.add_n("x", 2);
        assert_eq!(c.get("x"), 5);
        assert_eq!(c.get("missing"), 0);
    }

    #[test]
    fn empty_batch_degrades_to_empty_result() {
        let config = CorpusConfig::default();
        let analyzer = CorpusAnalyzer::new(&config);
        let mut rng = StdRng::seed_from_u64(1);
        let result = analyzer.analyze(&[], &mut rng);

        assert!(result.vocabulary.get("_overall").unwrap().is_empty());
        assert!(result.acronyms.is_empty());
        // only the synthetic `_overall` palette entry, itself empty
        assert_eq!(result.palettes.len(), 1);
        assert!(result.palettes[0].colors.is_empty());
        assert!(result.sample_text.is_empty());
        assert!(result.type_distribution.is_empty());
        assert!(result.common_titles.is_empty());
        assert_eq!(result.stats.total_slides, 0);
        assert_eq!(result.stats.unique_sources, 0);
    }
}
