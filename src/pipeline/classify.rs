//! Heuristic slide-type classification.
//!
//! An ordered rule chain evaluated top to bottom; the first matching rule
//! wins and `bullets` is the fallthrough default. Rule order is part of the
//! contract: later rules never override earlier matches, so ambiguous slides
//! bias toward the earliest applicable category (an agenda slide that happens
//! to mention "budget" is still an agenda).
//!
//! The chain is a static table of `(label, predicate)` pairs rather than
//! nested conditionals, so precedence is auditable at a glance and each rule
//! is testable in isolation.
//!
//! Classification is a pure function of three derived features: block count,
//! mean font size across blocks, and the lowercased full text.

use crate::record::{SlideType, TextBlock};
use once_cell::sync::Lazy;
use regex::Regex;

/// Derived page features the rule chain operates on.
///
/// `full_text` must already be lowercased; predicates do plain substring
/// checks against it.
#[derive(Debug, Clone)]
pub struct PageSignals<'a> {
    pub num_blocks: usize,
    pub mean_font_size: f32,
    pub full_text: &'a str,
}

impl<'a> PageSignals<'a> {
    /// Compute signals from the raw block list and a pre-lowercased text.
    pub fn from_blocks(blocks: &[TextBlock], lower_text: &'a str) -> Self {
        let num_blocks = blocks.len();
        let sum: f32 = blocks.iter().map(|b| b.avg_font_size).sum();
        Self {
            num_blocks,
            mean_font_size: sum / num_blocks.max(1) as f32,
            full_text: lower_text,
        }
    }
}

// ── Keyword tables ───────────────────────────────────────────────────────

const AGENDA_WORDS: &[&str] = &["agenda", "outline", "overview", "table of contents"];
const FISCAL_WORDS: &[&str] = &[
    "fy2", "fy1", "fydp", "budget", "funding", "$ in", "rdt&e", "procurement",
];
const TOTALS_WORDS: &[&str] = &["total", "mil", "000", "$"];
const TIMELINE_WORDS: &[&str] = &["timeline", "schedule", "milestone", "roadmap", "phased"];
const ORG_WORDS: &[&str] = &["organization", "command", "governance", "reporting"];
const MATRIX_WORDS: &[&str] = &[
    "risk", "matrix", "assessment", "status", "stoplight", "red", "yellow", "green",
];

/// Question/discussion marker: the words themselves or a `??` run.
static RE_QUESTIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"question|discussion|\?{2,}").unwrap());

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

// ── Rule chain ───────────────────────────────────────────────────────────

/// One entry of the ordered rule chain.
struct Rule {
    label: SlideType,
    matches: fn(&PageSignals) -> bool,
}

/// Evaluated in order; first match wins. Keep the order in sync with the
/// labels' documented precedence — reordering changes classification.
static RULES: &[Rule] = &[
    // Title slide: few blocks, large type.
    Rule {
        label: SlideType::Title,
        matches: |s| s.num_blocks <= 4 && s.mean_font_size > 18.0,
    },
    Rule {
        label: SlideType::Agenda,
        matches: |s| contains_any(s.full_text, AGENDA_WORDS),
    },
    Rule {
        label: SlideType::Questions,
        matches: |s| RE_QUESTIONS.is_match(s.full_text) && s.num_blocks <= 3,
    },
    Rule {
        label: SlideType::Backup,
        matches: |s| s.full_text.contains("backup") && s.num_blocks <= 3,
    },
    // Budget tables need both a fiscal keyword and a totals/money keyword.
    Rule {
        label: SlideType::Budget,
        matches: |s| {
            contains_any(s.full_text, FISCAL_WORDS) && contains_any(s.full_text, TOTALS_WORDS)
        },
    },
    Rule {
        label: SlideType::Timeline,
        matches: |s| contains_any(s.full_text, TIMELINE_WORDS),
    },
    Rule {
        label: SlideType::Orgchart,
        matches: |s| contains_any(s.full_text, ORG_WORDS),
    },
    Rule {
        label: SlideType::Matrix,
        matches: |s| contains_any(s.full_text, MATRIX_WORDS),
    },
];

/// Classify a page from its derived signals.
pub fn classify(signals: &PageSignals) -> SlideType {
    RULES
        .iter()
        .find(|r| (r.matches)(signals))
        .map(|r| r.label)
        .unwrap_or(SlideType::Bullets)
}

/// Convenience wrapper: classify from blocks and the raw full text.
pub fn classify_blocks(blocks: &[TextBlock], full_text: &str) -> SlideType {
    let lower = full_text.to_lowercase();
    classify(&PageSignals::from_blocks(blocks, &lower))
}
