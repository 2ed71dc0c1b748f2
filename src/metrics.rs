//! Advance widths of the PDF base-14 Helvetica faces.
//!
//! Widths are in thousandths of the font size for the printable ASCII range
//! (`' '..='~'`), taken from the Adobe font metrics.  Characters outside the range
//! are measured as a digit.

use crate::model::FontWeight;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Baseline-to-baseline distance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    333, 333, 584, 584, 584, 611, 975,
    // A-Z
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    333, 278, 333, 584, 556, 333,
    // a-z
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    // { | } ~
    389, 280, 389, 584,
];

/// Advance width of `ch` in thousandths of the font size.
pub fn char_width(ch: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match ch {
        ' '..='~' => table[ch as usize - 0x20],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, size_pt: f64, weight: FontWeight) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(char_width(ch, weight))).sum();
    f64::from(units) / 1000.0 * size_pt * MM_PER_PT
}

/// Baseline-to-baseline distance for `size_pt` in millimetres.
pub fn line_height_mm(size_pt: f64) -> f64 {
    size_pt * LINE_HEIGHT_FACTOR * MM_PER_PT
}

/// A wrapped line: its words and their left offsets from the line start.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub words: Vec<String>,
    pub offsets: Vec<f64>,
}

/// Greedily wraps `text` into lines no wider than `max_width_mm`.
///
/// A word wider than the limit gets a line of its own.
pub fn wrap_words(text: &str, max_width_mm: f64, size_pt: f64, weight: FontWeight) -> Vec<Vec<String>> {
    let space = text_width_mm(" ", size_pt, weight);
    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let width = text_width_mm(word, size_pt, weight);
        let candidate = if current.is_empty() {
            width
        } else {
            current_width + space + width
        };
        if !current.is_empty() && candidate > max_width_mm {
            lines.push(std::mem::take(&mut current));
            current_width = width;
        } else {
            current_width = candidate;
        }
        current.push(word.to_owned());
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps `text` and positions every word so each line except the last spans
/// exactly `max_width_mm`.
pub fn justify(text: &str, max_width_mm: f64, size_pt: f64, weight: FontWeight) -> Vec<WrappedLine> {
    let space = text_width_mm(" ", size_pt, weight);
    let lines = wrap_words(text, max_width_mm, size_pt, weight);
    let last = lines.len().saturating_sub(1);

    lines
        .into_iter()
        .enumerate()
        .map(|(index, words)| {
            let widths: Vec<f64> = words
                .iter()
                .map(|word| text_width_mm(word, size_pt, weight))
                .collect();
            let gaps = words.len().saturating_sub(1);
            let gap = if index == last || gaps == 0 {
                space
            } else {
                (max_width_mm - widths.iter().sum::<f64>()) / gaps as f64
            };

            let mut offsets = Vec::with_capacity(words.len());
            let mut cursor = 0.0;
            for width in &widths {
                offsets.push(cursor);
                cursor += width + gap;
            }
            WrappedLine { words, offsets }
        })
        .collect()
}
