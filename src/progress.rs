//! Progress-callback trait for per-document ingestion events.
//!
//! Inject an [`Arc<dyn IngestProgressCallback>`] via
//! [`crate::config::CorpusConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through a document batch.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, a database record,
//! or a terminal progress bar — without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` so it works
//! correctly when documents are extracted concurrently.
//!
//! # Example
//!
//! ```rust
//! use slidecorpus::{IngestProgressCallback, CorpusConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl IngestProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, doc_num: usize, total_docs: usize, slides: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Document {}/{} done ({} slides)", doc_num, total_docs, slides);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = CorpusConfig::builder()
//!     .progress_callback(counter as Arc<dyn IngestProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the ingestion pipeline as it works through a document batch.
///
/// Implementations must be `Send + Sync` (documents are extracted
/// concurrently). All methods have default no-op implementations so callers
/// only override what they care about.
///
/// # Thread safety
///
/// `on_document_start`, `on_document_complete`, and `on_document_error` may
/// be called concurrently from different workers. Implementations must
/// protect shared mutable state with appropriate synchronisation primitives
/// (e.g. `Mutex`, `AtomicUsize`).
pub trait IngestProgressCallback: Send + Sync {
    /// Called once before any document is opened.
    ///
    /// # Arguments
    /// * `total_docs` — number of documents that will be processed
    fn on_extract_start(&self, total_docs: usize) {
        let _ = total_docs;
    }

    /// Called just before a document is opened.
    ///
    /// # Arguments
    /// * `doc_num`    — 1-indexed document number (batch order)
    /// * `total_docs` — total documents in the batch
    fn on_document_start(&self, doc_num: usize, total_docs: usize) {
        let _ = (doc_num, total_docs);
    }

    /// Called when a document is fully extracted.
    ///
    /// # Arguments
    /// * `doc_num`    — 1-indexed document number
    /// * `total_docs` — total documents
    /// * `slides`     — slide records produced from this document
    fn on_document_complete(&self, doc_num: usize, total_docs: usize, slides: usize) {
        let _ = (doc_num, total_docs, slides);
    }

    /// Called when a document fails to open or extract.
    ///
    /// # Arguments
    /// * `doc_num`    — 1-indexed document number
    /// * `total_docs` — total documents
    /// * `error`      — human-readable error description
    fn on_document_error(&self, doc_num: usize, total_docs: usize, error: &str) {
        let _ = (doc_num, total_docs, error);
    }

    /// Called once after every document has been attempted, before
    /// aggregation begins.
    ///
    /// # Arguments
    /// * `total_docs`    — total documents in the batch
    /// * `success_count` — documents that extracted without error
    fn on_extract_complete(&self, total_docs: usize, success_count: usize) {
        let _ = (total_docs, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl IngestProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CorpusConfig`].
pub type ProgressCallback = Arc<dyn IngestProgressCallback>;
