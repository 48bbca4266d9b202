//! Per-document feature extraction: text runs → blocks, raster → colours.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! [`extract_document`] moves the whole per-document walk onto a blocking
//! thread; each worker owns its document exclusively, so documents extract
//! in parallel with no shared mutable state.
//!
//! ## Run grouping
//!
//! Pdfium exposes positioned text objects ("runs"), not paragraphs. Runs are
//! clustered into lines by vertical-centre proximity, and consecutive lines
//! into blocks when the inter-line gap stays below 1.5× the line height.
//! Within a line, runs join with a single space; lines join with `\n`.
//! Coordinates are flipped to a top-left origin at collection time so the
//! title-zone check downstream is a plain `y < 0.3 × height`.

use crate::config::CorpusConfig;
use crate::error::{CorpusError, DocumentError};
use crate::pipeline::{acronyms, assemble, classify, colors};
use crate::record::{BBox, ColorSample, SlideRecord, TextBlock, DEFAULT_FONT_SIZE};
use pdfium_render::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{debug, info, warn};

/// Vertical-centre tolerance (in line heights) for same-line membership.
const LINE_MERGE_FACTOR: f32 = 0.5;
/// Maximum inter-line gap (in line heights) within one block.
const BLOCK_GAP_FACTOR: f32 = 1.5;

/// One positioned text run, top-left origin.
#[derive(Debug, Clone)]
struct TextRun {
    text: String,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    font_size: f32,
    font_name: String,
}

impl TextRun {
    fn v_center(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// Check that a pdfium shared library can be bound.
///
/// Run once before a batch: a machine without pdfium fails the whole run
/// here instead of reporting every document as individually broken.
pub fn verify_pdfium() -> Result<(), CorpusError> {
    Pdfium::bind_to_system_library()
        .map(|_| ())
        .map_err(|e| CorpusError::PdfiumBindingFailed(format!("{:?}", e)))
}

/// Extract all slide records from one document.
///
/// Runs on a blocking thread (pdfium is CPU-bound and not async-safe).
/// A failure anywhere in the document maps to a single [`DocumentError`];
/// the caller logs it and the batch continues without this document.
pub async fn extract_document(
    path: std::path::PathBuf,
    config: CorpusConfig,
    rng_seed: Option<u64>,
) -> Result<Vec<SlideRecord>, DocumentError> {
    let source = source_name(&path);
    tokio::task::spawn_blocking(move || extract_document_blocking(&path, &config, rng_seed))
        .await
        .map_err(|e| DocumentError::OpenFailed {
            source_file: source,
            detail: format!("extraction task panicked: {}", e),
        })?
}

/// Blocking implementation of document extraction.
pub fn extract_document_blocking(
    path: &Path,
    config: &CorpusConfig,
    rng_seed: Option<u64>,
) -> Result<Vec<SlideRecord>, DocumentError> {
    let source_file = source_name(path);
    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Explicit bind: `Pdfium::default()` panics when no library is present,
    // and a panic inside `spawn_blocking` would masquerade as a document
    // failure.
    let bindings =
        Pdfium::bind_to_system_library().map_err(|e| DocumentError::OpenFailed {
            source_file: source_file.clone(),
            detail: format!("pdfium binding: {:?}", e),
        })?;
    let pdfium = Pdfium::new(bindings);
    let document =
        pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| DocumentError::OpenFailed {
                source_file: source_file.clone(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    debug!("'{}': {} pages", source_file, pages.len());

    let mut records = Vec::new();
    for (page_index, page) in pages.iter().enumerate() {
        if let Some(record) = extract_page(&page, page_index, &source_file, config, &mut rng) {
            records.push(record);
        }
    }

    info!(
        "'{}': {} slides from {} pages",
        source_file,
        records.len(),
        pages.len()
    );
    Ok(records)
}

/// Extract one page into a record; `None` for blank pages.
fn extract_page<R: Rng + ?Sized>(
    page: &PdfPage,
    page_index: usize,
    source_file: &str,
    config: &CorpusConfig,
    rng: &mut R,
) -> Option<SlideRecord> {
    let page_width = page.width().value;
    let page_height = page.height().value;

    let runs = collect_runs(page, page_height);
    let blocks = group_blocks(runs);
    if blocks.is_empty() {
        debug!("'{}' page {}: blank, skipped", source_file, page_index);
        return None;
    }

    let colors = page_colors(page, page_width, source_file, page_index, config, rng);

    let text = assemble::full_text(&blocks);
    let slide_type = classify::classify_blocks(&blocks, &text);
    let acronym_set = acronyms::extract_acronyms(&text);

    assemble::assemble_record(
        source_file,
        page_index,
        blocks,
        colors,
        slide_type,
        acronym_set,
        page_width,
        page_height,
    )
}

/// Rasterise the page at reduced scale and sample dominant colours.
///
/// Degrades to an empty list on any rendering failure — text extraction for
/// the page has already succeeded and still produces a record.
fn page_colors<R: Rng + ?Sized>(
    page: &PdfPage,
    page_width: f32,
    source_file: &str,
    page_index: usize,
    config: &CorpusConfig,
    rng: &mut R,
) -> Vec<ColorSample> {
    let target_width = (page_width * config.render_scale).max(1.0) as i32;
    let render_config = PdfRenderConfig::new().set_target_width(target_width);

    match page.render_with_config(&render_config) {
        Ok(bitmap) => {
            let image = bitmap.as_image();
            colors::sample_colors(&image, config.color_sample_size, rng)
        }
        Err(e) => {
            warn!(
                "{}",
                DocumentError::RenderFailed {
                    source_file: source_file.to_string(),
                    page: page_index,
                    detail: format!("{:?}", e),
                }
            );
            Vec::new()
        }
    }
}

/// Collect positioned text runs from a page, flipping to a top-left origin.
fn collect_runs(page: &PdfPage, page_height: f32) -> Vec<TextRun> {
    let mut runs = Vec::new();

    for object in page.objects().iter() {
        let Some(text_object) = object.as_text_object() else {
            continue;
        };
        let text = text_object.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(bounds) = object.bounds() else {
            continue;
        };

        runs.push(TextRun {
            text: trimmed.to_string(),
            left: bounds.left().value,
            right: bounds.right().value,
            // pdfium y grows upward; records use top-left origin
            top: page_height - bounds.top().value,
            bottom: page_height - bounds.bottom().value,
            font_size: text_object.unscaled_font_size().value,
            font_name: text_object.font().family(),
        });
    }

    runs
}

/// True if the run's vertical centre sits within half a line height of the
/// line's centre.
fn same_line(line: &[TextRun], run: &TextRun) -> bool {
    let line_top = line.iter().map(|r| r.top).fold(f32::MAX, f32::min);
    let line_bottom = line.iter().map(|r| r.bottom).fold(f32::MIN, f32::max);
    let line_center = (line_top + line_bottom) / 2.0;
    let tolerance = LINE_MERGE_FACTOR * (line_bottom - line_top).max(1.0);
    (run.v_center() - line_center).abs() <= tolerance
}

/// Group runs into lines, then lines into blocks.
fn group_blocks(mut runs: Vec<TextRun>) -> Vec<TextBlock> {
    if runs.is_empty() {
        return Vec::new();
    }

    runs.sort_by(|a, b| {
        a.top
            .partial_cmp(&b.top)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.left.partial_cmp(&b.left).unwrap_or(std::cmp::Ordering::Equal))
    });

    // runs → lines
    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if same_line(line, &run) => line.push(run),
            _ => lines.push(vec![run]),
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(std::cmp::Ordering::Equal));
    }

    // lines → blocks
    let mut groups: Vec<Vec<Vec<TextRun>>> = Vec::new();
    for line in lines {
        let line_top = line.iter().map(|r| r.top).fold(f32::MAX, f32::min);
        let starts_new = match groups.last().and_then(|g| g.last()) {
            Some(last_line) => {
                let last_bottom = last_line.iter().map(|r| r.bottom).fold(f32::MIN, f32::max);
                let last_top = last_line.iter().map(|r| r.top).fold(f32::MAX, f32::min);
                let line_height = (last_bottom - last_top).max(1.0);
                line_top - last_bottom > BLOCK_GAP_FACTOR * line_height
            }
            None => true,
        };
        match groups.last_mut() {
            Some(group) if !starts_new => group.push(line),
            _ => groups.push(vec![line]),
        }
    }

    groups.into_iter().filter_map(build_block).collect()
}

/// Materialise one block from its grouped lines.
fn build_block(lines: Vec<Vec<TextRun>>) -> Option<TextBlock> {
    let line_texts: Vec<String> = lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|t| !t.trim().is_empty())
        .collect();
    if line_texts.is_empty() {
        return None;
    }

    let all_runs: Vec<&TextRun> = lines.iter().flatten().collect();
    let left = all_runs.iter().map(|r| r.left).fold(f32::MAX, f32::min);
    let right = all_runs.iter().map(|r| r.right).fold(f32::MIN, f32::max);
    let top = all_runs.iter().map(|r| r.top).fold(f32::MAX, f32::min);
    let bottom = all_runs.iter().map(|r| r.bottom).fold(f32::MIN, f32::max);

    let sizes: Vec<f32> = all_runs
        .iter()
        .map(|r| r.font_size)
        .filter(|s| *s > 0.0)
        .collect();
    let avg_font_size = if sizes.is_empty() {
        DEFAULT_FONT_SIZE
    } else {
        sizes.iter().sum::<f32>() / sizes.len() as f32
    };

    let is_bold = all_runs
        .iter()
        .any(|r| r.font_name.to_lowercase().contains("bold"));
    let font = all_runs
        .first()
        .map(|r| r.font_name.clone())
        .unwrap_or_default();

    Some(TextBlock {
        text: line_texts.join("\n"),
        bbox: BBox {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        },
        avg_font_size,
        is_bold,
        font,
    })
}

/// Filename for provenance; falls back to the full path display.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
