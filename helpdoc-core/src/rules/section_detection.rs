//! "Validation Rules" sections.
//!
//! A heading line alone in its paragraph opens the section; the short or
//! marker-led lines right after it become the rule list.

use super::engine::{BlockRule, RuleOutput};
use super::list_detection::{is_list_item, strip_list_marker};
use crate::types::{Block, RawFragment};
use regex::Regex;
use std::sync::LazyLock;

pub const RULES_HEADING: &str = "Validation Rules";

static RULE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*validation rules\s*:?\s*$").unwrap());

// Looser prefix form used for the paragraph index
static RULE_SECTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*validation rules\s*:*").unwrap());

/// The whole line is the heading, with at most one trailing colon.
pub fn is_rule_heading(text: &str) -> bool {
    RULE_HEADING.is_match(text)
}

/// Line starts with the heading phrase, whatever follows.
pub fn is_rule_section_line(text: &str) -> bool {
    RULE_SECTION_LINE.is_match(text)
}

pub struct ValidationRulesRule {
    short_item_max_chars: usize,
}

impl ValidationRulesRule {
    pub fn new(short_item_max_chars: usize) -> Self {
        Self {
            short_item_max_chars,
        }
    }

    fn is_short(&self, text: &str) -> bool {
        text.chars().count() < self.short_item_max_chars
    }

    fn continues_list(&self, text: &str) -> bool {
        is_list_item(text) || self.is_short(text)
    }
}

impl BlockRule for ValidationRulesRule {
    fn name(&self) -> &str {
        "ValidationRules"
    }

    fn matches(&self, fragment: &RawFragment) -> bool {
        fragment.paragraph_text().is_some_and(is_rule_heading)
    }

    fn apply(&self, fragments: &[RawFragment]) -> RuleOutput {
        let items: Vec<String> = fragments
            .iter()
            .skip(1)
            .map_while(|fragment| {
                fragment
                    .paragraph_text()
                    .filter(|text| self.continues_list(text))
            })
            .map(strip_list_marker)
            .collect();

        let consumed = 1 + items.len();
        log::debug!("Validation rules section with {} items", items.len());

        let mut blocks = vec![Block::Heading {
            text: RULES_HEADING.to_string(),
        }];
        if !items.is_empty() {
            blocks.push(Block::List { items });
        }
        RuleOutput { blocks, consumed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn paras(texts: &[&str]) -> Vec<RawFragment> {
        texts
            .iter()
            .map(|t| RawFragment::Paragraph(t.to_string()))
            .collect()
    }

    #[rstest]
    #[case("Validation Rules", true)]
    #[case("Validation Rules:", true)]
    #[case("  VALIDATION RULES :  ", true)]
    #[case("Validation Rules::", false)]
    #[case("Validation Rules: must be numeric", false)]
    #[case("No validation rules", false)]
    fn test_is_rule_heading(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_rule_heading(text), expected);
    }

    #[rstest]
    #[case("Validation Rules:", true)]
    #[case("Validation rules: must be numeric", true)]
    #[case("Validation Rules:: x", true)]
    #[case("The validation rules", false)]
    fn test_is_rule_section_line(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_rule_section_line(text), expected);
    }

    #[test]
    fn test_marker_lines_continue_even_when_long() {
        let long_item = "1. A rule line that is certainly longer than sixty characters overall";
        let fragments = paras(&["Validation Rules", long_item, "Short one"]);
        let output = ValidationRulesRule::new(60).apply(&fragments);
        assert_eq!(output.consumed, 3);
        assert_eq!(
            output.blocks[1],
            Block::List {
                items: vec![
                    "A rule line that is certainly longer than sixty characters overall".to_string(),
                    "Short one".to_string(),
                ]
            }
        );
    }

    #[test]
    fn test_heading_without_items_emits_no_list() {
        let fragments = paras(&[
            "Validation Rules:",
            "A paragraph that is long enough to stop the list before it even starts.",
        ]);
        let output = ValidationRulesRule::new(60).apply(&fragments);
        assert_eq!(output.consumed, 1);
        assert_eq!(
            output.blocks,
            vec![Block::Heading {
                text: RULES_HEADING.to_string()
            }]
        );
    }

    #[test]
    fn test_table_stops_the_list() {
        let fragments = vec![
            RawFragment::Paragraph("Validation Rules".to_string()),
            RawFragment::Paragraph("Must be A".to_string()),
            RawFragment::Table("<table/>".to_string()),
            RawFragment::Paragraph("Must be B".to_string()),
        ];
        let output = ValidationRulesRule::new(60).apply(&fragments);
        assert_eq!(output.consumed, 2);
    }

    #[test]
    fn test_threshold_is_strict_and_configurable() {
        let exactly_ten = "abcdefghij";
        let fragments = paras(&["Validation Rules", exactly_ten]);
        assert_eq!(ValidationRulesRule::new(10).apply(&fragments).consumed, 1);
        assert_eq!(ValidationRulesRule::new(11).apply(&fragments).consumed, 2);
    }
}
