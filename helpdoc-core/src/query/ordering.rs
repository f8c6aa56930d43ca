//! Display order for entries and the navigation list built on it.

use super::search::{filter, matches_query};
use crate::types::{DocumentModel, Entry, OVERVIEW_ANCHOR};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Label shown for the synthetic overview item.
pub const OVERVIEW_LABEL: &str = "Overview";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub anchor: String,
    pub label: String,
    pub obsolete: bool,
}

impl NavItem {
    fn for_entry(entry: &Entry) -> Self {
        Self {
            anchor: entry.anchor.clone(),
            label: entry.label.clone(),
            obsolete: entry.obsolete,
        }
    }

    fn overview() -> Self {
        Self {
            anchor: OVERVIEW_ANCHOR.to_string(),
            label: OVERVIEW_LABEL.to_string(),
            obsolete: false,
        }
    }
}

/// Sort entries for display.
///
/// Entries anchored at `overview` come first. After them, labels with a
/// leading digit run precede all others and compare by that number; the rest
/// compare alphabetically, ignoring case and accents. The sort is stable, so
/// ties keep extraction order.
pub fn order<'a, I>(entries: I) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut ordered: Vec<&Entry> = entries.into_iter().collect();
    ordered.sort_by(|a, b| compare_entries(a, b));
    ordered
}

fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    let a_overview = a.anchor == OVERVIEW_ANCHOR;
    let b_overview = b.anchor == OVERVIEW_ANCHOR;
    match (a_overview, b_overview) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (true, true) => return Ordering::Equal,
        (false, false) => {}
    }
    compare_labels(&a.label, &b.label)
}

pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (leading_digits(a), leading_digits(b)) {
        (Some(x), Some(y)) => compare_digit_runs(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => collation_key(a).cmp(&collation_key(b)),
    }
}

fn leading_digits(label: &str) -> Option<&str> {
    let end = label
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    (end > 0).then(|| &label[..end])
}

// Numeric comparison of arbitrarily long digit strings
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Base-letter key: decomposed, combining marks dropped, lower-cased.
fn collation_key(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Navigation list for `model` under `query`: the overview item, then the
/// filtered entries in display order.
///
/// The synthetic overview item appears when the query is blank or hits an
/// overview paragraph, unless an entry already owns the overview anchor.
pub fn table_of_contents(model: &DocumentModel, query: &str) -> Vec<NavItem> {
    let entries = filter(&model.entries, query);
    let mut items = Vec::with_capacity(entries.len() + 1);

    let overview_hit = query.trim().is_empty()
        || model
            .overview_paragraphs
            .iter()
            .any(|p| matches_query(p, query));
    let anchor_taken = model.entry_by_anchor(OVERVIEW_ANCHOR).is_some();
    if overview_hit && !anchor_taken {
        items.push(NavItem::overview());
    }

    items.extend(entries.into_iter().map(NavItem::for_entry));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::slugify;
    use std::collections::BTreeSet;

    fn entry(label: &str) -> Entry {
        Entry {
            label: label.to_string(),
            anchor: slugify(label),
            paragraphs: vec![format!("About {label}.")],
            blocks: Vec::new(),
            obsolete: false,
            rule_section_indexes: BTreeSet::new(),
        }
    }

    fn labels(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|e| e.label.clone()).collect()
    }

    #[test]
    fn test_numeric_prefix_before_alphabetic() {
        let entries: Vec<Entry> = ["B Field", "10 Field", "2 Field", "A Field"]
            .into_iter()
            .map(entry)
            .collect();
        assert_eq!(
            labels(&order(&entries)),
            vec!["2 Field", "10 Field", "A Field", "B Field"]
        );
    }

    #[test]
    fn test_overview_entry_sorts_first() {
        let entries: Vec<Entry> = ["Zeta", "1 First", "Overview"]
            .into_iter()
            .map(entry)
            .collect();
        assert_eq!(labels(&order(&entries)), vec!["Overview", "1 First", "Zeta"]);
    }

    #[test]
    fn test_alphabetic_ignores_case_and_accents() {
        assert_eq!(compare_labels("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_labels("Éclair", "eclair"), Ordering::Equal);
        assert_eq!(compare_labels("Éclair", "Date"), Ordering::Greater);
    }

    #[test]
    fn test_ties_keep_extraction_order() {
        let entries: Vec<Entry> = ["3.B", "abc", "3.A", "ABC"].into_iter().map(entry).collect();
        assert_eq!(labels(&order(&entries)), vec!["3.B", "3.A", "abc", "ABC"]);
    }

    #[test]
    fn test_long_digit_runs_compare_numerically() {
        assert_eq!(
            compare_labels("99999999999999999999999 x", "100000000000000000000000 y"),
            Ordering::Less
        );
        assert_eq!(compare_labels("007", "7"), Ordering::Equal);
    }

    #[test]
    fn test_table_of_contents_blank_query() {
        let model = DocumentModel {
            overview_paragraphs: vec!["Intro".to_string()],
            entries: vec![entry("B"), entry("A")],
            ..DocumentModel::default()
        };
        let toc = table_of_contents(&model, "  ");
        let anchors: Vec<&str> = toc.iter().map(|i| i.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["overview", "a", "b"]);
        assert_eq!(toc[0].label, OVERVIEW_LABEL);
    }

    #[test]
    fn test_table_of_contents_filters_overview() {
        let model = DocumentModel {
            overview_paragraphs: vec!["Loan parameters".to_string()],
            entries: vec![entry("RATE"), entry("LOAN.TYPE")],
            ..DocumentModel::default()
        };
        let toc = table_of_contents(&model, "loan");
        let anchors: Vec<&str> = toc.iter().map(|i| i.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["overview", "loan-type"]);

        let toc = table_of_contents(&model, "rate");
        let anchors: Vec<&str> = toc.iter().map(|i| i.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["rate"]);
    }

    #[test]
    fn test_real_overview_entry_suppresses_synthetic_item() {
        let model = DocumentModel {
            entries: vec![entry("X"), entry("Overview")],
            ..DocumentModel::default()
        };
        let toc = table_of_contents(&model, "");
        let anchors: Vec<&str> = toc.iter().map(|i| i.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["overview", "x"]);
    }
}
