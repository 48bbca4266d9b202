//! Per-page extraction stages.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. the run-grouping heuristic) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ classify ──▶ assemble
//! (pdfium)    (rule chain)  (record)
//!    │            │
//!    ├─ colors    └─ acronyms
//!    (raster sample)  (token scan)
//! ```
//!
//! 1. [`extract`]  — open a document, group pdfium text runs into blocks,
//!    drive the per-page stages; runs in `spawn_blocking` because pdfium is
//!    not async-safe
//! 2. [`colors`]   — reduced-scale raster, random pixel sample, quantized
//!    colour ranking
//! 3. [`classify`] — ordered first-match-wins rule chain over derived signals
//! 4. [`acronyms`] — uppercase-token scan and expansion-candidate scan
//! 5. [`assemble`] — merge everything into a capped, normalized [`crate::record::SlideRecord`]

pub mod acronyms;
pub mod assemble;
pub mod classify;
pub mod colors;
pub mod extract;
