//! HTML flattening: reduce a chat HTML export to plain text for the
//! document's "Chat HTML Export" section.
//!
//! The output target is a single wrapped paragraph, so no structure survives:
//! headings, lists and tables all become lines of text. Passes run in a fixed
//! order:
//!
//! 1. Drop comments, `<script>`, `<style>` and `<head>` blocks (never visible)
//! 2. Turn `<br>` and block-level closing tags into line breaks
//! 3. Strip every remaining tag
//! 4. Decode character entities
//! 5. Normalise line endings and trim trailing whitespace per line
//! 6. Collapse runs of blank lines to a single blank line

use once_cell::sync::Lazy;
use regex::Regex;

/// Extract the visible text of an HTML document.
pub fn extract_text(html: &str) -> String {
    let s = drop_invisible_blocks(html);
    let s = break_block_elements(&s);
    let s = strip_tags(&s);
    let s = decode_entities(&s);
    let s = normalise_lines(&s);
    collapse_blank_lines(&s)
}

// ── Pass 1: invisible blocks ─────────────────────────────────────────────────

static RE_COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static RE_INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<head\b[^>]*>.*?</head\s*>")
        .unwrap()
});

static RE_DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").unwrap());

fn drop_invisible_blocks(input: &str) -> String {
    let s = RE_COMMENTS.replace_all(input, "");
    let s = RE_INVISIBLE.replace_all(&s, "");
    RE_DOCTYPE.replace_all(&s, "").into_owned()
}

// ── Pass 2: block boundaries ─────────────────────────────────────────────────

static RE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static RE_BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|div|li|tr|h[1-6]|pre|blockquote|section|article|table|ul|ol)\s*>")
        .unwrap()
});

fn break_block_elements(input: &str) -> String {
    let s = RE_BREAKS.replace_all(input, "\n");
    RE_BLOCK_CLOSE.replace_all(&s, "$0\n").into_owned()
}

// ── Pass 3: remaining tags ───────────────────────────────────────────────────

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)</?[A-Za-z][^>]*>").unwrap());

fn strip_tags(input: &str) -> String {
    RE_TAGS.replace_all(input, "").into_owned()
}

// ── Pass 4: entities ─────────────────────────────────────────────────────────

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]{2,8});").unwrap());

fn decode_entities(input: &str) -> String {
    RE_ENTITY
        .replace_all(input, |caps: &regex::Captures<'_>| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "bull" => '\u{2022}',
        "middot" => '\u{00B7}',
        "euro" => '\u{20AC}',
        "times" => '\u{00D7}',
        _ => return None,
    };
    Some(ch.to_string())
}

// ── Pass 5: line endings and trailing whitespace ─────────────────────────────

fn normalise_lines(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Pass 6: blank lines ──────────────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES
        .replace_all(input.trim_matches('\n'), "\n\n")
        .into_owned()
}
