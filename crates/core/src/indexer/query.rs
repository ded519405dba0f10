//! Search keyword classification.
//!
//! Backends index overwhelmingly English-named releases, so a keyword that
//! is mostly CJK text would only burn a request quota to return nothing.
//! Keywords are classified up front: IMDb identifiers go through the typed
//! id-search path, plausible-English text goes through free-text search and
//! everything else is rejected before any network call.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static IMDB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^tt\d{7,}$").unwrap());

/// Characters stripped before the character-class ratios are computed.
const STRIP: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}', '-', '_',
];

/// A keyword that passed classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// Full "tt"-prefixed IMDb identifier
    ImdbId(String),
    /// Free-text keyword
    Text(String),
}

impl QueryKind {
    /// Classify a raw keyword. Returns `None` when the keyword should not be
    /// sent to any backend.
    pub fn classify(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        if IMDB_RE.is_match(keyword) {
            return Some(Self::ImdbId(keyword.to_string()));
        }
        if is_english_like(keyword) {
            return Some(Self::Text(keyword.to_string()));
        }
        None
    }

    /// The numeric portion of an IMDb id, for backends that reject the "tt"
    /// prefix.
    pub fn imdb_digits(&self) -> Option<&str> {
        match self {
            Self::ImdbId(id) => Some(&id[2..]),
            Self::Text(_) => None,
        }
    }
}

/// Heuristic for "this keyword could plausibly match English release names".
///
/// An empty keyword never passes. Punctuation, whitespace and separators are
/// stripped next; a keyword that is nothing but separators passes. Otherwise
/// the keyword passes when it is at most 30% CJK characters and more than
/// half ASCII.
pub fn is_english_like(keyword: &str) -> bool {
    if keyword.trim().is_empty() {
        return false;
    }

    let stripped: Vec<char> = keyword
        .chars()
        .filter(|c| !c.is_whitespace() && !STRIP.contains(c))
        .collect();

    if stripped.is_empty() {
        return true;
    }

    let total = stripped.len() as f64;
    let ascii = stripped.iter().filter(|c| c.is_ascii()).count() as f64;
    let cjk = stripped.iter().filter(|c| is_cjk(**c)).count() as f64;

    if cjk / total > 0.3 {
        return false;
    }
    ascii / total > 0.5
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'   // CJK Unified Ideographs
        | '\u{3040}'..='\u{309f}' // Hiragana
        | '\u{30a0}'..='\u{30ff}' // Katakana
        | '\u{ac00}'..='\u{d7af}' // Hangul
    )
}

/// Normalize an IMDb id to its "tt"-prefixed form. Accepts both "0133093"
/// and "tt0133093"; anything empty or non-numeric yields `None`.
pub fn normalize_imdb_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return None;
    }
    if let Some(digits) = raw.strip_prefix("tt") {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(raw.to_string());
        }
        return None;
    }
    if raw.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("tt{}", raw));
    }
    None
}
