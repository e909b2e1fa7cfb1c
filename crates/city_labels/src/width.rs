//! Approximate rendered width of a string in a proportional sans-serif face.
//!
//! Widths come from a fixed per-character table (milli-inches at roughly 12pt)
//! rather than real font metrics, so values are only meaningful relative to
//! each other and to a threshold computed with the same table.

use crate::constants::MILLI_INCH_TO_PICA;

/// Contribution of a character outside every listed class.
const DEFAULT_MILLI_INCHES: u32 = 50;

const WIDTH_CLASSES: [(&str, u32); 7] = [
    ("lij|' ", 37),
    ("![]fI.,:;/\\t", 50),
    ("`-(){}r\"", 60),
    ("*^zcsJkvxy", 85),
    ("aebdhnopqug#$L+<>=?_~FZT0123456789", 95),
    ("BSPEAKVXY&UwNRCHD", 112),
    ("QGOMm%W@", 135),
];

/// Width of one character in milli-inches.
pub fn char_milli_inches(c: char) -> u32 {
    WIDTH_CLASSES
        .iter()
        .find(|(members, _)| members.contains(c))
        .map(|&(_, size)| size)
        .unwrap_or(DEFAULT_MILLI_INCHES)
}

/// Estimated width of `text` in picas.
pub fn estimate_width(text: &str) -> f64 {
    let size: u64 = text.chars().map(|c| u64::from(char_milli_inches(c))).sum();
    size as f64 * MILLI_INCH_TO_PICA
}

/// Estimated width of `text` in points when set at `font_size` points.
///
/// The table is calibrated for a 12pt face and a pica is 12pt, so the pica
/// width scales directly into points per point of font size.
pub fn estimate_text_points(text: &str, font_size: f64) -> f64 {
    estimate_width(text) * font_size
}

/// Width threshold in whole picas: the estimated width of `glyph` repeated
/// `repeat` times, floored.
pub fn width_threshold(glyph: &str, repeat: usize) -> f64 {
    estimate_width(&glyph.repeat(repeat)).floor()
}
