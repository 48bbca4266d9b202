//! Corpus persistence: the seven JSON artifacts a run produces.
//!
//! Six full artifacts (vocabulary, acronyms, palettes, sample text, common
//! titles, metadata) carry everything the analysis computed; the seventh,
//! `slim_corpus.json`, is a compact projection for direct frontend loading.
//! The slim build is strict truncation of already-ranked lists — it never
//! re-sorts, so the full and slim corpora always agree on ordering.
//!
//! Writes are atomic (temp file + rename) so a crashed run can never leave a
//! half-written artifact behind.

use crate::analyze::AnalysisResult;
use crate::error::CorpusError;
use crate::record::truncate_chars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

// Slim-corpus truncation caps.
const SLIM_OVERALL_TERMS: usize = 300;
const SLIM_TERMS_PER_TYPE: usize = 100;
const SLIM_ACRONYMS: usize = 200;
const SLIM_TITLES: usize = 100;
const SLIM_PALETTES: usize = 30;
const SLIM_SAMPLES_PER_TYPE: usize = 5;
const SLIM_SAMPLE_TITLE_CAP: usize = 100;
const SLIM_SAMPLE_TEXT_CAP: usize = 200;

/// A slim acronym entry; `e` is empty when no expansion was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlimAcronym {
    pub a: String,
    pub e: String,
}

/// A slim sample: title plus a short excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlimSample {
    pub t: String,
    pub s: String,
}

/// The compact corpus projection written as `slim_corpus.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlimCorpus {
    pub terms: Vec<String>,
    pub type_vocab: BTreeMap<String, Vec<String>>,
    pub acronyms: Vec<SlimAcronym>,
    pub titles: Vec<String>,
    pub palettes: Vec<Vec<String>>,
    pub samples: BTreeMap<String, Vec<SlimSample>>,
    pub stats: crate::analyze::CorpusStats,
}

/// Writes analysis results to a corpus directory.
pub struct CorpusWriter {
    corpus_dir: PathBuf,
}

impl CorpusWriter {
    /// Create a writer rooted at `corpus_dir`, creating the directory if
    /// needed.
    pub async fn new(corpus_dir: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let corpus_dir = corpus_dir.into();
        tokio::fs::create_dir_all(&corpus_dir)
            .await
            .map_err(|e| CorpusError::OutputWriteFailed {
                path: corpus_dir.clone(),
                source: e,
            })?;
        Ok(Self { corpus_dir })
    }

    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// Write all seven corpus artifacts.
    pub async fn write(&self, analysis: &AnalysisResult) -> Result<(), CorpusError> {
        self.write_json("vocabulary.json", &analysis.vocabulary)
            .await?;
        self.write_json("acronyms.json", &analysis.acronyms).await?;
        self.write_json("palettes.json", &analysis.palettes).await?;
        self.write_json("sample_text.json", &analysis.sample_text)
            .await?;
        self.write_json("common_titles.json", &analysis.common_titles)
            .await?;
        self.write_json(
            "corpus_meta.json",
            &json!({
                "type_distribution": analysis.type_distribution,
                "stats": analysis.stats,
            }),
        )
        .await?;
        self.write_json("slim_corpus.json", &build_slim_corpus(analysis))
            .await?;

        info!("All corpus files written to {}", self.corpus_dir.display());
        Ok(())
    }

    /// Serialize `data` as pretty JSON and atomically place it at
    /// `filename` inside the corpus directory.
    async fn write_json<T: Serialize>(
        &self,
        filename: &str,
        data: &T,
    ) -> Result<(), CorpusError> {
        let body =
            serde_json::to_vec_pretty(data).map_err(|e| CorpusError::SerializeFailed {
                artifact: filename.to_string(),
                source: e,
            })?;
        let size_kb = body.len() as f64 / 1024.0;

        let path = self.corpus_dir.join(filename);
        // Atomic write: write to temp, then rename
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(|e| CorpusError::OutputWriteFailed {
                path: tmp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| CorpusError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        info!("Wrote {filename} ({size_kb:.1} KB)");
        Ok(())
    }
}

/// Build the compact projection from a full analysis.
///
/// Pure truncation: every list keeps its ranking from the analysis, and
/// per-sample strings get tighter caps. Keys starting with `_` (the
/// synthetic `_overall` vocabulary) are excluded from `type_vocab`.
pub fn build_slim_corpus(analysis: &AnalysisResult) -> SlimCorpus {
    let terms = analysis
        .vocabulary
        .get("_overall")
        .map(|overall| {
            overall
                .iter()
                .take(SLIM_OVERALL_TERMS)
                .map(|t| t.term.clone())
                .collect()
        })
        .unwrap_or_default();

    let type_vocab = analysis
        .vocabulary
        .iter()
        .filter(|(slide_type, _)| !slide_type.starts_with('_'))
        .map(|(slide_type, terms)| {
            (
                slide_type.clone(),
                terms
                    .iter()
                    .take(SLIM_TERMS_PER_TYPE)
                    .map(|t| t.term.clone())
                    .collect(),
            )
        })
        .collect();

    let acronyms = analysis
        .acronyms
        .iter()
        .take(SLIM_ACRONYMS)
        .map(|a| SlimAcronym {
            a: a.acronym.clone(),
            e: a.expansion.clone().unwrap_or_default(),
        })
        .collect();

    let titles = analysis
        .common_titles
        .iter()
        .take(SLIM_TITLES)
        .map(|t| t.title.clone())
        .collect();

    let palettes = analysis
        .palettes
        .iter()
        .take(SLIM_PALETTES)
        .map(|p| p.colors.clone())
        .collect();

    let samples = analysis
        .sample_text
        .iter()
        .map(|(slide_type, examples)| {
            let slim: Vec<SlimSample> = examples
                .iter()
                .take(SLIM_SAMPLES_PER_TYPE)
                .map(|ex| SlimSample {
                    t: truncate_chars(&ex.title, SLIM_SAMPLE_TITLE_CAP),
                    s: truncate_chars(&ex.text, SLIM_SAMPLE_TEXT_CAP),
                })
                .collect();
            (slide_type.clone(), slim)
        })
        .collect();

    SlimCorpus {
        terms,
        type_vocab,
        acronyms,
        titles,
        palettes,
        samples,
        stats: analysis.stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{
        AcronymEntry, CorpusStats, Palette, SampleText, TermCount, TitleCount,
    };

    fn analysis() -> AnalysisResult {
        let mut vocabulary = BTreeMap::new();
        vocabulary.insert(
            "_overall".to_string(),
            (0..400)
                .map(|i| TermCount {
                    term: format!("term{i}"),
                    count: 400 - i as u64,
                })
                .collect(),
        );
        vocabulary.insert(
            "bullets".to_string(),
            (0..150)
                .map(|i| TermCount {
                    term: format!("b{i}"),
                    count: 150 - i as u64,
                })
                .collect(),
        );

        let mut sample_text = BTreeMap::new();
        sample_text.insert(
            "bullets".to_string(),
            (0..8)
                .map(|i| SampleText {
                    title: format!("Sample {i} {}", "t".repeat(150)),
                    text: "x".repeat(400),
                    num_blocks: 3,
                })
                .collect(),
        );

        AnalysisResult {
            vocabulary,
            acronyms: vec![
                AcronymEntry {
                    acronym: "DOD".into(),
                    count: 10,
                    expansion: Some("Department of Defense".into()),
                },
                AcronymEntry {
                    acronym: "NC3".into(),
                    count: 4,
                    expansion: None,
                },
            ],
            palettes: vec![Palette {
                slide_type: "title".into(),
                colors: vec!["#003366".into(), "#c8102e".into()],
            }],
            sample_text,
            type_distribution: BTreeMap::new(),
            common_titles: vec![TitleCount {
                title: "AGENDA".into(),
                count: 15,
            }],
            stats: CorpusStats {
                total_slides: 100,
                unique_sources: 10,
            },
        }
    }

    #[test]
    fn slim_truncates_without_reordering() {
        let slim = build_slim_corpus(&analysis());
        assert_eq!(slim.terms.len(), 300);
        assert_eq!(slim.terms[0], "term0");
        assert_eq!(slim.type_vocab["bullets"].len(), 100);
        assert_eq!(slim.type_vocab["bullets"][0], "b0");
        assert!(!slim.type_vocab.contains_key("_overall"));
    }

    #[test]
    fn slim_acronyms_flatten_missing_expansion_to_empty() {
        let slim = build_slim_corpus(&analysis());
        assert_eq!(slim.acronyms[0].a, "DOD");
        assert_eq!(slim.acronyms[0].e, "Department of Defense");
        assert_eq!(slim.acronyms[1].a, "NC3");
        assert_eq!(slim.acronyms[1].e, "");
    }

    #[test]
    fn slim_samples_capped_and_shortened() {
        let slim = build_slim_corpus(&analysis());
        let bullets = &slim.samples["bullets"];
        assert_eq!(bullets.len(), 5);
        assert!(bullets.iter().all(|s| s.t.chars().count() <= 100));
        assert!(bullets.iter().all(|s| s.s.chars().count() <= 200));
    }

    #[test]
    fn slim_preserves_stats() {
        let slim = build_slim_corpus(&analysis());
        assert_eq!(slim.stats.total_slides, 100);
        assert_eq!(slim.stats.unique_sources, 10);
    }

    #[tokio::test]
    async fn writer_produces_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CorpusWriter::new(dir.path().join("corpus")).await.unwrap();
        writer.write(&analysis()).await.unwrap();

        for name in [
            "vocabulary.json",
            "acronyms.json",
            "palettes.json",
            "sample_text.json",
            "common_titles.json",
            "corpus_meta.json",
            "slim_corpus.json",
        ] {
            let path = writer.corpus_dir().join(name);
            assert!(path.is_file(), "missing {name}");
            // every artifact parses back as JSON
            let body = tokio::fs::read(&path).await.unwrap();
            serde_json::from_slice::<serde_json::Value>(&body).unwrap();
        }
        // no temp leftovers
        assert!(!writer.corpus_dir().join("slim_corpus.json.tmp").exists());
    }

    #[tokio::test]
    async fn slim_corpus_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CorpusWriter::new(dir.path()).await.unwrap();
        writer.write(&analysis()).await.unwrap();

        let body = tokio::fs::read(writer.corpus_dir().join("slim_corpus.json"))
            .await
            .unwrap();
        let slim: SlimCorpus = serde_json::from_slice(&body).unwrap();
        assert_eq!(slim.terms.len(), 300);
        assert_eq!(slim.titles, vec!["AGENDA"]);
    }
}
