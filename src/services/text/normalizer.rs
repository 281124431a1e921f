//! Text normalization for card names and classification strings.
//! Makes comparisons insensitive to case, accents and punctuation noise.

use deunicode::deunicode_char;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Apostrophes, quotes and backticks (straight and typographic).
static RE_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['’‘`"“”]"#).expect("Invalid regex"));

/// Hyphen, underscore, en dash, em dash.
static RE_DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_–—]+").expect("Invalid regex"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Canonicalize free text for matching.
///
/// Pipeline:
/// 1. Lowercase
/// 2. NFD decomposition, drop combining marks, fold ß/æ/ø style letters
/// 3. Remove apostrophes, quotes and backticks
/// 4. Hyphens, underscores and dashes become spaces
/// 5. Collapse whitespace and trim
///
/// Total and idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let folded = strip_diacritics(&lower);
    let unquoted = RE_QUOTES.replace_all(&folded, "");
    let undashed = RE_DASHES.replace_all(&unquoted, " ");
    let collapsed = RE_WHITESPACE.replace_all(&undashed, " ");
    collapsed.trim().to_string()
}

/// Normalize an optional field, mapping absence to the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// NFD-decompose and drop combining marks, then fold the Latin letters that
/// have no decomposition (ß → ss, æ → ae, ø → o). Other scripts keep their
/// base letters.
fn strip_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii() || !is_latin_letter(c) {
            out.push(c);
            continue;
        }
        match deunicode_char(c) {
            Some(base) if !base.is_empty() && base.chars().all(|b| b.is_ascii_alphabetic()) => {
                out.push_str(&base.to_ascii_lowercase());
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_latin_letter(c: char) -> bool {
    matches!(c as u32, 0x00C0..=0x024F | 0x1E00..=0x1EFF) && c != '×' && c != '÷'
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
