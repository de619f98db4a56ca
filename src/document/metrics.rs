//! Helvetica font metrics and greedy line wrapping.
//!
//! pdfium places text objects but has no flowing-text layout, so wrapping is
//! done here with the standard Helvetica and Helvetica-Bold advance widths
//! (Adobe AFM, units of 1/1000 em). Characters outside printable ASCII use
//! the width of a digit, which is close to the Latin average.

use super::{Font, FontStyle};

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Advance width used for characters missing from the tables.
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica widths for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

/// Helvetica-Bold widths for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn glyph_units(ch: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    (ch as u32)
        .checked_sub(0x20)
        .and_then(|idx| table.get(idx as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Advance width of one character in millimetres.
pub fn char_width(ch: char, font: Font) -> f32 {
    glyph_units(ch, font.style) as f32 * font.size_pt / 1000.0 / PT_PER_MM
}

/// Width of a single line of text in millimetres.
pub fn text_width(text: &str, font: Font) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_units(c, font.style) as u32).sum();
    units as f32 * font.size_pt / 1000.0 / PT_PER_MM
}

/// Font size converted to millimetres.
pub fn size_mm(font: Font) -> f32 {
    font.size_pt / PT_PER_MM
}

/// Break `text` into lines no wider than `max_width` millimetres.
///
/// Explicit newlines always break (a single trailing newline is ignored),
/// words wrap greedily at spaces, and a word wider than the line is split
/// between characters. Tabs become four spaces. Empty input yields one empty
/// line so an empty paragraph still occupies a line.
pub fn wrap_text(text: &str, font: Font, max_width: f32) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.strip_suffix('\n').unwrap_or(&text);

    let mut lines = Vec::new();
    for raw in text.split('\n') {
        wrap_line(&raw.replace('\t', "    "), font, max_width, &mut lines);
    }
    lines
}

fn wrap_line(line: &str, font: Font, max_width: f32, out: &mut Vec<String>) {
    let space_w = char_width(' ', font);
    let mut current = String::new();
    let mut current_w = 0.0_f32;
    // Splitting on single spaces yields empty words for runs and leading
    // spaces; each still costs one separator so indentation survives.
    let mut started = false;

    for word in line.split(' ') {
        let word_w = text_width(word, font);
        let sep_w = if started { space_w } else { 0.0 };

        if current_w + sep_w + word_w <= max_width {
            if started {
                current.push(' ');
            }
            current.push_str(word);
            current_w += sep_w + word_w;
        } else if word.is_empty() {
            // Spaces at a break are swallowed.
        } else if word_w <= max_width {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
            current_w = word_w;
        } else {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_w = 0.0;
            }
            for ch in word.chars() {
                let cw = char_width(ch, font);
                if current_w + cw > max_width && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(ch);
                current_w += cw;
            }
        }
        started = true;
    }

    out.push(current);
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Font = Font::regular(11.0);

    #[test]
    fn tables_cover_printable_ascii() {
        assert_eq!(glyph_units(' ', FontStyle::Regular), 278);
        assert_eq!(glyph_units('~', FontStyle::Regular), 584);
        assert_eq!(glyph_units('W', FontStyle::Bold), 944);
        assert_eq!(glyph_units('i', FontStyle::Regular), 222);
        assert_eq!(glyph_units('i', FontStyle::Bold), 278);
    }

    #[test]
    fn unknown_chars_use_fallback() {
        assert_eq!(glyph_units('é', FontStyle::Regular), FALLBACK_WIDTH);
        assert_eq!(glyph_units('\u{1F600}', FontStyle::Bold), FALLBACK_WIDTH);
        assert_eq!(glyph_units('\u{7}', FontStyle::Regular), FALLBACK_WIDTH);
    }

    #[test]
    fn text_width_scales_with_size() {
        // H e l l o = 722 + 556 + 222 + 222 + 556 = 2278 units
        let w12 = text_width("Hello", Font::regular(12.0));
        let expected = 2278.0 * 12.0 / 1000.0 / PT_PER_MM;
        assert!((w12 - expected).abs() < 1e-4, "{w12} vs {expected}");
        let w24 = text_width("Hello", Font::regular(24.0));
        assert!((w24 - 2.0 * w12).abs() < 1e-4);
    }

    #[test]
    fn bold_is_wider() {
        assert!(text_width("abc", Font::bold(11.0)) > text_width("abc", Font::regular(11.0)));
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrap_text("hello world", BODY, 188.0), vec!["hello world"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", BODY, 188.0), vec![String::new()]);
    }

    #[test]
    fn newlines_break_and_trailing_newline_ignored() {
        assert_eq!(wrap_text("a\n\nb\n", BODY, 188.0), vec!["a", "", "b"]);
        assert_eq!(wrap_text("a\r\nb", BODY, 188.0), vec!["a", "b"]);
    }

    #[test]
    fn wraps_at_spaces() {
        let one_word = text_width("word", BODY);
        let lines = wrap_text("word word word", BODY, one_word * 2.5);
        assert_eq!(lines, vec!["word word", "word"]);
    }

    #[test]
    fn long_word_is_split() {
        let max = text_width("aaaa", BODY) + 0.01;
        let lines = wrap_text("aaaaaaaaaa", BODY, max);
        assert_eq!(lines, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn no_line_exceeds_width() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let max = 60.0;
        for line in wrap_text(&text, BODY, max) {
            assert!(text_width(&line, BODY) <= max + 1e-3, "too wide: {line:?}");
        }
    }

    #[test]
    fn indentation_and_space_runs_are_kept() {
        let code = "fn main() {\n    println!(\"hi\");\n}";
        assert_eq!(
            wrap_text(code, BODY, 188.0),
            vec!["fn main() {", "    println!(\"hi\");", "}"]
        );
        assert_eq!(wrap_text("a  b", BODY, 188.0), vec!["a  b"]);
        assert_eq!(wrap_text("\tx", BODY, 188.0), vec!["    x"]);
    }
}
