//! Configuration for a corpus extraction run.
//!
//! All tunable behaviour is controlled through [`CorpusConfig`], built via its
//! [`CorpusConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across extraction workers, log it alongside a run, and
//! diff two runs to understand why their corpora differ.
//!
//! The stop-word set and frequency thresholds deliberately live here rather
//! than as module statics: the vocabulary builder receives them as plain
//! data, so tests can shrink the set and per-run tuning needs no recompile.

use crate::error::CorpusError;
use crate::progress::ProgressCallback;
use std::collections::HashSet;

/// Stop words excluded from vocabulary counting.
///
/// Common English function words plus a handful of filler adverbs that
/// dominate briefing prose without carrying domain signal.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "can", "could", "of",
    "in", "to", "for", "with", "on", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "above", "below", "between", "out", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how", "all", "each",
    "every", "both", "few", "more", "most", "other", "some", "such", "no", "not", "only", "own",
    "same", "so", "than", "too", "very", "just", "because", "but", "and", "or", "if", "while",
    "this", "that", "these", "those", "it", "its", "he", "she", "they", "them", "their", "his",
    "her", "we", "our", "you", "your", "i", "me", "my", "which", "what", "who", "whom", "whose",
    "about", "also", "any", "another", "back", "even", "still", "already", "much", "many",
    "since", "however", "although", "well", "really", "quite", "rather",
];

/// Configuration for a corpus extraction run.
///
/// Built via [`CorpusConfig::builder()`] or [`CorpusConfig::default()`].
///
/// # Example
/// ```rust
/// use slidecorpus::CorpusConfig;
///
/// let config = CorpusConfig::builder()
///     .workers(8)
///     .seed(42)
///     .color_sample_size(500)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CorpusConfig {
    /// Number of documents extracted concurrently. Default: 4.
    ///
    /// Extraction is CPU-bound (pdfium parsing + rasterisation) and each
    /// worker owns its document exclusively, so this maps directly onto
    /// `spawn_blocking` threads. Raise it on wide machines; the aggregation
    /// stage is unaffected because it only starts once the batch is complete.
    pub workers: usize,

    /// Scale factor applied when rasterising a page for colour sampling.
    /// Range: (0, 1]. Default: 0.5.
    ///
    /// Colour frequency is insensitive to resolution — a half-scale raster
    /// samples the same colour distribution at a quarter of the pixel cost.
    pub render_scale: f32,

    /// Number of pixels drawn (without replacement) from each page raster.
    /// Default: 1000.
    ///
    /// Shrinks automatically when a raster holds fewer pixels than requested.
    pub color_sample_size: usize,

    /// RNG seed for palette sampling, sample-text shuffling, and item-order
    /// shuffling during acquisition. `None` (default) seeds from entropy;
    /// set it to make a run reproducible end to end.
    pub seed: Option<u64>,

    /// Words excluded from vocabulary counting. Default: [`DEFAULT_STOP_WORDS`].
    pub stop_words: HashSet<String>,

    /// Minimum count for a per-type vocabulary term. Default: 2.
    pub min_term_count: u64,

    /// Minimum count for an overall vocabulary term. Default: 3.
    pub min_overall_count: u64,

    /// Cap on per-type vocabulary lists. Default: 500.
    pub max_terms_per_type: usize,

    /// Cap on the overall vocabulary list. Default: 1000.
    pub max_overall_terms: usize,

    /// Representative text samples kept per slide type. Default: 10.
    pub samples_per_type: usize,

    /// Cap on the ranked common-title list. Default: 200.
    pub max_titles: usize,

    /// Delay between archive API requests in milliseconds. Default: 1000.
    ///
    /// Archive.org asks crawlers to stay near 1 request/second; going faster
    /// risks throttling that costs more time than the delay saves.
    pub request_delay_ms: u64,

    /// Per-file download timeout in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional callback receiving per-document ingestion events.
    /// Default: `None` (no events).
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            render_scale: 0.5,
            color_sample_size: 1000,
            seed: None,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            min_term_count: 2,
            min_overall_count: 3,
            max_terms_per_type: 500,
            max_overall_terms: 1000,
            samples_per_type: 10,
            max_titles: 200,
            request_delay_ms: 1000,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl CorpusConfig {
    /// Create a new builder for `CorpusConfig`.
    pub fn builder() -> CorpusConfigBuilder {
        CorpusConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CorpusConfig`].
pub struct CorpusConfigBuilder {
    config: CorpusConfig,
}

impl CorpusConfigBuilder {
    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn color_sample_size(mut self, n: usize) -> Self {
        self.config.color_sample_size = n.max(1);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_term_count(mut self, n: u64) -> Self {
        self.config.min_term_count = n;
        self
    }

    pub fn min_overall_count(mut self, n: u64) -> Self {
        self.config.min_overall_count = n;
        self
    }

    pub fn max_terms_per_type(mut self, n: usize) -> Self {
        self.config.max_terms_per_type = n;
        self
    }

    pub fn max_overall_terms(mut self, n: usize) -> Self {
        self.config.max_overall_terms = n;
        self
    }

    pub fn samples_per_type(mut self, n: usize) -> Self {
        self.config.samples_per_type = n;
        self
    }

    pub fn max_titles(mut self, n: usize) -> Self {
        self.config.max_titles = n;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Inject a progress callback for per-document ingestion events.
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CorpusConfig, CorpusError> {
        let c = &self.config;
        if !(c.render_scale > 0.0 && c.render_scale <= 1.0) {
            return Err(CorpusError::InvalidConfig(format!(
                "render_scale must be in (0, 1], got {}",
                c.render_scale
            )));
        }
        if c.workers == 0 {
            return Err(CorpusError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if c.color_sample_size == 0 {
            return Err(CorpusError::InvalidConfig(
                "color_sample_size must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
