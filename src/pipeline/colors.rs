//! Dominant-colour extraction from a rendered page raster.
//!
//! The page is rasterised at a reduced scale (colour frequency is insensitive
//! to resolution), a fixed-size uniform random pixel sample is drawn without
//! replacement, each RGB triple is quantized by flooring channels to the
//! nearest multiple of 16, and the quantized colours are ranked by frequency.
//! Near-white and near-black samples (mean channel outside the open interval
//! (30, 230)) are dropped after the top-20 cut, before the final top-10 cap —
//! a page dominated by white background can legitimately yield fewer than 10
//! colours.
//!
//! The random source is injected so tests can seed it; production derives a
//! per-document seed from the run configuration.

use crate::record::ColorSample;
use image::DynamicImage;
use rand::Rng;
use std::collections::HashMap;

/// Colours ranked before the brightness filter.
const PRE_FILTER_TOP: usize = 20;
/// Colours returned per page.
const TOP_COLORS: usize = 10;
/// Open brightness interval (mean channel value) a colour must fall inside.
const MIN_BRIGHTNESS: f32 = 30.0;
const MAX_BRIGHTNESS: f32 = 230.0;

/// Floor a channel to the nearest lower multiple of 16.
///
/// Collapses near-duplicate colours (anti-aliasing fringes, JPEG noise) into
/// one bucket. Idempotent: a multiple of 16 maps to itself.
pub fn quantize_channel(c: u8) -> u8 {
    (c / 16) * 16
}

/// Lowercase `#rrggbb` for a quantized triple.
pub fn hex_color(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parse a `#rrggbb` string back into channels.
pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let s = hex.strip_prefix('#')?;
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Mean channel brightness of a colour.
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

/// True if a colour survives the near-white/near-black filter.
pub fn in_brightness_range(r: u8, g: u8, b: u8) -> bool {
    let v = brightness(r, g, b);
    v > MIN_BRIGHTNESS && v < MAX_BRIGHTNESS
}

/// Sample dominant colours from a rendered page image.
///
/// Draws up to `sample_size` pixels without replacement (clamped to the pixel
/// count), quantizes, ranks, filters, and returns at most [`TOP_COLORS`]
/// entries with `frequency = count / drawn`, rounded to 3 decimals. An empty
/// or zero-sized image yields an empty list.
pub fn sample_colors<R: Rng + ?Sized>(
    image: &DynamicImage,
    sample_size: usize,
    rng: &mut R,
) -> Vec<ColorSample> {
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let total_pixels = width * height;
    if total_pixels == 0 || sample_size == 0 {
        return Vec::new();
    }

    // The sample cannot exceed the raster itself.
    let drawn = sample_size.min(total_pixels);
    let indices = rand::seq::index::sample(rng, total_pixels, drawn);

    // first-seen order recorded for deterministic tie-breaks
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    for idx in indices.iter() {
        let x = (idx % width) as u32;
        let y = (idx / width) as u32;
        let px = rgb.get_pixel(x, y);
        let hex = hex_color(
            quantize_channel(px[0]),
            quantize_channel(px[1]),
            quantize_channel(px[2]),
        );
        let next_order = counts.len();
        let entry = counts.entry(hex).or_insert((0, next_order));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, u64, usize)> =
        counts.into_iter().map(|(hex, (n, ord))| (hex, n, ord)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(PRE_FILTER_TOP);

    ranked
        .into_iter()
        .filter(|(hex, _, _)| {
            parse_hex(hex).is_some_and(|[r, g, b]| in_brightness_range(r, g, b))
        })
        .take(TOP_COLORS)
        .map(|(hex, count, _)| ColorSample {
            hex,
            frequency: (count as f64 / drawn as f64 * 1000.0).round() / 1000.0,
        })
        .collect()
}
