//! Representative colour palettes per slide type.
//!
//! Every record with at least two extracted colours contributes a palette of
//! its first five hexes (already ranked by on-page frequency). Per type, up
//! to five palettes are drawn at random; the synthetic `_overall` entry ranks
//! individual colours across all palettes instead, dropping near-white and
//! near-black hexes before counting.

use crate::pipeline::colors::{in_brightness_range, parse_hex};
use crate::record::SlideRecord;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{FrequencyCounter, Palette};

/// Colours a record's palette keeps.
const PALETTE_SIZE: usize = 5;
/// Random palettes kept per slide type.
const PALETTES_PER_TYPE: usize = 5;
/// Colours in the `_overall` entry.
const OVERALL_TOP: usize = 10;

pub fn build_palettes<R: Rng + ?Sized>(records: &[SlideRecord], rng: &mut R) -> Vec<Palette> {
    // (type, colors) in batch order; grouping preserves first-seen type order
    let mut groups: Vec<(String, Vec<Vec<String>>)> = Vec::new();
    let mut color_counts = FrequencyCounter::new();

    for record in records {
        if record.colors.len() < 2 {
            continue;
        }
        let palette: Vec<String> = record
            .colors
            .iter()
            .take(PALETTE_SIZE)
            .map(|c| c.hex.clone())
            .collect();

        for hex in &palette {
            if parse_hex(hex).is_some_and(|[r, g, b]| in_brightness_range(r, g, b)) {
                color_counts.add(hex.clone());
            }
        }

        let slide_type = record.slide_type.as_str();
        match groups.iter_mut().find(|(t, _)| t == slide_type) {
            Some((_, palettes)) => palettes.push(palette),
            None => groups.push((slide_type.to_string(), vec![palette])),
        }
    }

    let mut result: Vec<Palette> = Vec::new();
    for (slide_type, palettes) in groups {
        for colors in palettes.choose_multiple(rng, PALETTES_PER_TYPE) {
            result.push(Palette {
                slide_type: slide_type.clone(),
                colors: colors.clone(),
            });
        }
    }

    result.push(Palette {
        slide_type: "_overall".to_string(),
        colors: color_counts
            .most_common(OVERALL_TOP)
            .into_iter()
            .map(|(hex, _)| hex)
            .collect(),
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ColorSample, SlideType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(slide_type: SlideType, hexes: &[&str]) -> SlideRecord {
        SlideRecord {
            source_file: "deck.pdf".into(),
            page_num: 0,
            slide_type,
            title: String::new(),
            full_text: String::new(),
            text_blocks: vec![],
            colors: hexes
                .iter()
                .map(|h| ColorSample {
                    hex: h.to_string(),
                    frequency: 0.1,
                })
                .collect(),
            acronyms: vec![],
            num_text_blocks: 1,
            page_width: 720.0,
            page_height: 540.0,
        }
    }

    #[test]
    fn single_color_records_excluded() {
        let records = vec![record(SlideType::Bullets, &["#306090"])];
        let mut rng = StdRng::seed_from_u64(1);
        let palettes = build_palettes(&records, &mut rng);
        // only the `_overall` entry, and it is empty
        assert_eq!(palettes.len(), 1);
        assert_eq!(palettes[0].slide_type, "_overall");
        assert!(palettes[0].colors.is_empty());
    }

    #[test]
    fn palettes_capped_at_five_colors() {
        let records = vec![record(
            SlideType::Bullets,
            &["#103050", "#203050", "#303050", "#403050", "#503050", "#603050"],
        )];
        let mut rng = StdRng::seed_from_u64(1);
        let palettes = build_palettes(&records, &mut rng);
        let bullets = palettes.iter().find(|p| p.slide_type == "bullets").unwrap();
        assert_eq!(bullets.colors.len(), 5);
    }

    #[test]
    fn at_most_five_palettes_per_type() {
        let records: Vec<SlideRecord> = (0..12)
            .map(|_| record(SlideType::Bullets, &["#306090", "#405060"]))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let palettes = build_palettes(&records, &mut rng);
        let bullets = palettes.iter().filter(|p| p.slide_type == "bullets").count();
        assert_eq!(bullets, 5);
    }

    #[test]
    fn overall_skips_out_of_range_colors() {
        // near-white and near-black only: palette entry exists, but the
        // colors contribute nothing to the overall ranking
        let records = vec![record(SlideType::Bullets, &["#f0f0f0", "#101010"])];
        let mut rng = StdRng::seed_from_u64(1);
        let palettes = build_palettes(&records, &mut rng);
        let overall = palettes.iter().find(|p| p.slide_type == "_overall").unwrap();
        assert!(overall.colors.is_empty());
        assert!(palettes.iter().any(|p| p.slide_type == "bullets"));
    }

    #[test]
    fn overall_ranks_by_frequency() {
        let records = vec![
            record(SlideType::Bullets, &["#306090", "#405060"]),
            record(SlideType::Title, &["#306090", "#605040"]),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let palettes = build_palettes(&records, &mut rng);
        let overall = palettes.iter().find(|p| p.slide_type == "_overall").unwrap();
        assert_eq!(overall.colors[0], "#306090");
        assert_eq!(overall.colors.len(), 3);
    }
}
