//! Substring search over entries and highlight spans for matched text.

use super::ordering::order;
use crate::types::Entry;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// A piece of text, flagged when it matched the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub text: String,
    pub matched: bool,
}

impl HighlightSpan {
    fn new(text: &str, matched: bool) -> Self {
        Self {
            text: text.to_string(),
            matched,
        }
    }
}

/// Case-insensitive substring test with a trimmed query. Blank matches all.
pub fn matches_query(text: &str, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || text.to_lowercase().contains(&needle)
}

/// Entries whose label or any paragraph contains `query`, in display order.
pub fn filter<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return order(entries);
    }
    order(entries.iter().filter(|entry| {
        entry.label.to_lowercase().contains(&needle)
            || entry
                .paragraphs
                .iter()
                .any(|p| p.to_lowercase().contains(&needle))
    }))
}

/// Split `text` into matched and unmatched spans for `query`.
///
/// The trimmed query is matched literally and case-insensitively. Empty
/// spans are left out, so an empty `text` yields no spans.
pub fn highlight_spans(text: &str, query: &str) -> Vec<HighlightSpan> {
    let needle = query.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if needle.is_empty() {
        return vec![HighlightSpan::new(text, false)];
    }

    let pattern = match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(err) => {
            log::debug!("Highlight query {needle:?} not usable: {err}");
            return vec![HighlightSpan::new(text, false)];
        }
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            spans.push(HighlightSpan::new(&text[last..found.start()], false));
        }
        if !found.as_str().is_empty() {
            spans.push(HighlightSpan::new(found.as_str(), true));
        }
        last = found.end();
    }
    if last < text.len() {
        spans.push(HighlightSpan::new(&text[last..], false));
    }
    spans
}

/// Render `text` with every match wrapped in `open`/`close`.
pub fn render_highlighted(text: &str, query: &str, open: &str, close: &str) -> String {
    highlight_spans(text, query)
        .into_iter()
        .map(|span| {
            if span.matched {
                format!("{open}{}{close}", span.text)
            } else {
                span.text
            }
        })
        .collect()
}
