//! Data model: per-page extraction output and the normalized slide record.
//!
//! Everything here is plain serde data. [`TextBlock`] is the raw extraction
//! shape (page points); [`RecordBlock`] is its capped, page-relative form as
//! stored on a [`SlideRecord`]. Records are assembled once per non-blank page
//! and never mutated afterwards — ownership moves wholesale into the analyzer
//! batch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caps applied at assembly time (not analysis time). A record either
/// respects all of them or is not emitted.
pub const MAX_FULL_TEXT_CHARS: usize = 2000;
pub const MAX_BLOCK_TEXT_CHARS: usize = 500;
pub const MAX_BLOCKS_PER_RECORD: usize = 20;
pub const MAX_COLORS_PER_RECORD: usize = 10;

/// Fallback font size when no run in a block carries one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// One coherent region of text on a page, as produced by run grouping.
///
/// Ordering follows the rendering layer's object order; reading order is not
/// guaranteed. Coordinates are page points with `y` measured from the top
/// edge, so "near the top" is simply a small `y`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block text: runs on a line joined with a space, lines joined with `\n`.
    pub text: String,
    /// Bounding box in page points (x, y from top-left).
    pub bbox: BBox,
    /// Mean font size over runs with a recorded size; [`DEFAULT_FONT_SIZE`]
    /// when none had one.
    pub avg_font_size: f32,
    /// True if any run's font name contains "bold" (case-insensitive).
    pub is_bold: bool,
    /// Font name of the first observed run; empty when unavailable.
    pub font: String,
}

/// Axis-aligned bounding box in page points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A quantized colour with its observed sample frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    /// Lowercase `#rrggbb`; every channel is a multiple of 16.
    pub hex: String,
    /// Occurrence count / sample size, in [0, 1], rounded to 3 decimals.
    pub frequency: f64,
}

/// Categorical label for a page's communicative role.
///
/// Closed set; classification always returns exactly one of these, with
/// [`SlideType::Bullets`] as the fallthrough default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideType {
    Title,
    Agenda,
    Questions,
    Backup,
    Budget,
    Timeline,
    Orgchart,
    Matrix,
    Bullets,
}

impl SlideType {
    /// All labels, in rule-chain order.
    pub const ALL: [SlideType; 9] = [
        SlideType::Title,
        SlideType::Agenda,
        SlideType::Questions,
        SlideType::Backup,
        SlideType::Budget,
        SlideType::Timeline,
        SlideType::Orgchart,
        SlideType::Matrix,
        SlideType::Bullets,
    ];

    /// The serialized (lowercase) name, used as a JSON map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideType::Title => "title",
            SlideType::Agenda => "agenda",
            SlideType::Questions => "questions",
            SlideType::Backup => "backup",
            SlideType::Budget => "budget",
            SlideType::Timeline => "timeline",
            SlideType::Orgchart => "orgchart",
            SlideType::Matrix => "matrix",
            SlideType::Bullets => "bullets",
        }
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text block as stored on a record: text capped, position normalized to
/// page-relative percentages (rounded to 0.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBlock {
    pub text: String,
    pub font_size: f32,
    pub is_bold: bool,
    pub position: BlockPosition,
}

/// Top-left corner of a block as a percentage of page width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x_pct: f32,
    pub y_pct: f32,
}

/// The unit of downstream processing: one normalized record per non-blank
/// page. Created by [`crate::pipeline::assemble`]; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Provenance: filename of the source document.
    pub source_file: String,
    /// 0-based page index within the source document.
    pub page_num: usize,
    pub slide_type: SlideType,
    /// Best-guess title; empty when no block qualified.
    pub title: String,
    /// Concatenated block texts, capped at [`MAX_FULL_TEXT_CHARS`].
    pub full_text: String,
    /// Capped at [`MAX_BLOCKS_PER_RECORD`] entries.
    pub text_blocks: Vec<RecordBlock>,
    /// Ranked dominant colours, capped at [`MAX_COLORS_PER_RECORD`].
    pub colors: Vec<ColorSample>,
    /// Distinct acronym tokens, sorted for stable output.
    pub acronyms: Vec<String>,
    /// Block count before capping.
    pub num_text_blocks: usize,
    /// Page dimensions in points, rounded to 0.1.
    pub page_width: f32,
    pub page_height: f32,
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
///
/// Byte-index truncation would panic on multi-byte text (smart quotes and
/// en-dashes are everywhere in briefing decks).
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Round to one decimal place.
pub(crate) fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}
