//! Slide-record assembly: merge per-page extraction outputs into one
//! normalized [`SlideRecord`].
//!
//! Assembly is where the fixed caps apply (full text 2000 chars, block text
//! 500 chars, 20 blocks) and where block positions become page-relative
//! percentages. Pages with zero text blocks are dropped here — a silent,
//! non-fatal skip, never an error. A record is either fully assembled or not
//! emitted at all.

use crate::record::{
    round1, truncate_chars, BlockPosition, ColorSample, RecordBlock, SlideRecord, SlideType,
    TextBlock, MAX_BLOCKS_PER_RECORD, MAX_COLORS_PER_RECORD, MAX_FULL_TEXT_CHARS,
    MAX_BLOCK_TEXT_CHARS,
};
use std::collections::BTreeSet;

/// Fraction of page height considered the "title zone".
const TITLE_ZONE: f32 = 0.3;

/// Join block texts into the page's full text (uncapped).
pub fn full_text(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the title block: the block with the largest average font size whose
/// top edge lies within the top 30 % of the page.
///
/// Blocks are scanned in descending font-size order (stable, so extraction
/// order breaks ties); the first qualifying block wins. No qualifying block
/// means an empty title — there is deliberately no fallback.
pub fn pick_title(blocks: &[TextBlock], page_height: f32) -> String {
    let mut by_size: Vec<&TextBlock> = blocks.iter().collect();
    by_size.sort_by(|a, b| {
        b.avg_font_size
            .partial_cmp(&a.avg_font_size)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    by_size
        .iter()
        .find(|b| b.bbox.y < page_height * TITLE_ZONE)
        .map(|b| b.text.clone())
        .unwrap_or_default()
}

/// Assemble one record from the page's extraction outputs.
///
/// Returns `None` for blank pages (no text blocks). The classifier label and
/// acronym set are computed by the caller from the same block list so that
/// classification sees the uncapped text.
#[allow(clippy::too_many_arguments)]
pub fn assemble_record(
    source_file: &str,
    page_num: usize,
    blocks: Vec<TextBlock>,
    colors: Vec<ColorSample>,
    slide_type: SlideType,
    acronyms: BTreeSet<String>,
    page_width: f32,
    page_height: f32,
) -> Option<SlideRecord> {
    if blocks.is_empty() {
        return None;
    }

    let text = full_text(&blocks);
    let title = pick_title(&blocks, page_height);
    let num_text_blocks = blocks.len();

    // Guard degenerate page geometry so percentages stay finite.
    let w = page_width.max(1.0);
    let h = page_height.max(1.0);

    let text_blocks: Vec<RecordBlock> = blocks
        .iter()
        .take(MAX_BLOCKS_PER_RECORD)
        .map(|b| RecordBlock {
            text: truncate_chars(&b.text, MAX_BLOCK_TEXT_CHARS),
            font_size: round1(b.avg_font_size),
            is_bold: b.is_bold,
            position: BlockPosition {
                x_pct: round1(b.bbox.x / w * 100.0),
                y_pct: round1(b.bbox.y / h * 100.0),
            },
        })
        .collect();

    let mut colors = colors;
    colors.truncate(MAX_COLORS_PER_RECORD);

    Some(SlideRecord {
        source_file: source_file.to_string(),
        page_num,
        slide_type,
        title,
        full_text: truncate_chars(&text, MAX_FULL_TEXT_CHARS),
        text_blocks,
        colors,
        acronyms: acronyms.into_iter().collect(),
        num_text_blocks,
        page_width: round1(page_width),
        page_height: round1(page_height),
    })
}
