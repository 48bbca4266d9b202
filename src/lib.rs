//! # slidecorpus
//!
//! Build a structured JSON corpus from slide-deck PDFs.
//!
//! ## Why this crate?
//!
//! Generating convincing synthetic briefing slides needs real statistics:
//! which words and phrases decks actually use, which acronyms appear and what
//! they expand to, what colours the decks are painted in, and how slide types
//! are distributed. This crate extracts those statistics from a batch of real
//! PDF decks and writes them as JSON artifacts a generator can load directly.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDFs (local dir or Archive.org collection)
//!  │
//!  ├─ 1. Extract   per page: text runs → blocks, raster → colour sample
//!  │               (pdfium, CPU-bound, spawn_blocking, N workers)
//!  ├─ 2. Classify  rule chain labels each page (title/agenda/budget/…)
//!  ├─ 3. Assemble  capped, normalized SlideRecord per non-blank page
//!  ├─ 4. Analyze   five batch-wide reductions (vocabulary, acronyms,
//!  │               palettes, samples, distribution + titles)
//!  └─ 5. Persist   seven JSON artifacts incl. the compact slim_corpus.json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slidecorpus::{ingest, local_documents, CorpusConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CorpusConfig::builder().workers(8).seed(42).build()?;
//!     let docs = local_documents("downloads")?;
//!     let stats = ingest(&docs, "corpus", &config).await?;
//!     eprintln!("{} slides from {} documents",
//!         stats.total_slides, stats.total_documents);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `slidecorpus` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! slidecorpus = { version = "0.1", default-features = false }
//! ```
//!
//! ## Determinism
//!
//! Every random choice (colour pixel sampling, palette selection, sample-text
//! shuffling, crawl ordering) flows through an injected RNG. Set
//! [`CorpusConfigBuilder::seed`](config::CorpusConfigBuilder::seed) and two
//! runs over the same documents produce byte-identical corpora.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{AnalysisResult, CorpusAnalyzer, CorpusStats};
pub use config::{CorpusConfig, CorpusConfigBuilder, DEFAULT_STOP_WORDS};
pub use corpus::{build_slim_corpus, CorpusWriter, SlimCorpus};
pub use error::{CorpusError, DocumentError};
pub use ingest::{extract_batch, ingest, IngestStats};
pub use progress::{IngestProgressCallback, NoopProgressCallback, ProgressCallback};
pub use record::{SlideRecord, SlideType};
pub use source::{local_documents, ArchiveSource};
