use super::engine::{BlockRule, RuleOutput};
use crate::types::{Block, RawFragment};
use regex::Regex;
use std::sync::LazyLock;

// (1)  1.  1)  A.  A)  -  –  •  *   each followed by whitespace
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\(?\d+\)?[.)]|[A-Z][.)]|[-–•*])\s+").unwrap());

pub fn is_list_item(text: &str) -> bool {
    LIST_MARKER.is_match(text)
}

/// Item text without its leading marker.
pub fn strip_list_marker(text: &str) -> String {
    LIST_MARKER.replace(text, "").trim().to_string()
}

/// Consumes a run of consecutive marker lines into one list.
pub struct ListDetectionRule;

impl BlockRule for ListDetectionRule {
    fn name(&self) -> &str {
        "ListDetection"
    }

    fn matches(&self, fragment: &RawFragment) -> bool {
        fragment.paragraph_text().is_some_and(is_list_item)
    }

    fn apply(&self, fragments: &[RawFragment]) -> RuleOutput {
        let items: Vec<String> = fragments
            .iter()
            .map_while(|fragment| fragment.paragraph_text().filter(|text| is_list_item(text)))
            .map(strip_list_marker)
            .collect();

        let consumed = items.len();
        log::debug!("List detected with {consumed} items");
        RuleOutput {
            blocks: vec![Block::List { items }],
            consumed,
        }
    }
}
