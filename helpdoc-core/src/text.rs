//! Text normalization and anchor slugs.
//!
//! Every piece of text that enters the model goes through [`normalize`];
//! every label gets its anchor from [`slugify`].

use regex::Regex;
use std::sync::LazyLock;

/// Maximum anchor length in characters.
pub const SLUG_MAX_LEN: usize = 80;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.:%);])").unwrap());

static NON_ALNUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Collapse whitespace runs to one space, trim, and drop whitespace in front
/// of closing punctuation (`, . : % ) ;`).
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    SPACE_BEFORE_PUNCT
        .replace_all(&collapsed, "$1")
        .trim()
        .to_string()
}

/// Collapse whitespace runs to one space and trim, leaving punctuation alone.
pub fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw, " ").trim().to_string()
}

/// Derive a stable anchor from a label.
///
/// Lower-cases, turns every run of characters outside `[a-z0-9]` into one
/// hyphen, strips hyphens at both ends and truncates to [`SLUG_MAX_LEN`].
pub fn slugify(label: &str) -> String {
    let lowered = label.to_lowercase();
    let hyphenated = NON_ALNUM_RUN.replace_all(&lowered, "-");
    // Output is pure ASCII at this point, so char and byte counts agree.
    let trimmed = hyphenated.trim_matches('-');
    trimmed.chars().take(SLUG_MAX_LEN).collect()
}
