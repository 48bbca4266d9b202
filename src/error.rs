//! Error types for the slidecorpus library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CorpusError`] — **Fatal**: the batch run cannot proceed at all
//!   (no documents to process, unwritable corpus directory, pdfium missing).
//!   Returned as `Err(CorpusError)` from the top-level `ingest` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: one document (or one page of it)
//!   failed to extract. The document contributes zero records, the failure is
//!   logged, and the batch continues. Nothing below document granularity ever
//!   propagates to the batch.
//!
//! The separation enforces the containment policy: a corrupt deck in a
//! 500-file download must never cost more than its own slides.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the slidecorpus library.
///
/// Document-level failures use [`DocumentError`] and are contained inside the
/// extraction loop rather than propagated here.
#[derive(Debug, Error)]
pub enum CorpusError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input directory does not exist or cannot be read.
    #[error("Cannot read document directory '{path}': {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to process: no local PDFs found and no downloads succeeded.
    #[error("No documents available to process.\nPoint --input-dir at a directory of PDFs or run a download first.")]
    NoDocuments,

    /// The archive search API itself failed — without an item list the
    /// acquisition stage cannot start. Individual item/file failures are
    /// skipped, not fatal.
    #[error("Archive search failed for query '{query}': {reason}")]
    SearchFailed { query: String, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write a corpus artifact.
    #[error("Failed to write corpus file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A result object could not be serialized. Indicates a bug, not bad
    /// input — all corpus types are plain data.
    #[error("Failed to serialize '{artifact}': {source}")]
    SerializeFailed {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// No pdfium shared library could be bound. Checked once per run, before
    /// any document is opened.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Place libpdfium.so / pdfium.dll next to the binary or install it on the system library path."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error scoped to a single document or page.
///
/// Produced inside the extraction loop; callers log it and move on. Stored in
/// [`crate::ingest::IngestStats`] so a post-run report can list which files
/// were skipped and why.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The document could not be opened or parsed at all.
    #[error("'{source_file}': failed to open: {detail}")]
    OpenFailed { source_file: String, detail: String },

    /// Rasterisation for colour sampling failed. The page still contributes
    /// a record, just with an empty colour list.
    #[error("'{source_file}' page {page}: rasterisation failed: {detail}")]
    RenderFailed {
        source_file: String,
        page: usize,
        detail: String,
    },

    /// A download from the archive failed (HTTP error, timeout, short read).
    #[error("download of '{filename}' failed: {detail}")]
    DownloadFailed { filename: String, detail: String },
}
