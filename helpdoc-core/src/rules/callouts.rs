use super::engine::{BlockRule, RuleOutput};
use crate::types::{Block, CalloutTone, RawFragment};
use regex::Regex;
use std::sync::LazyLock;

static NOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*note\s*[:\-–]\s*").unwrap());
static EXAMPLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*example\s*[:\-–]\s*").unwrap());
static UNAVAILABLE_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)help text .*unavailable").unwrap());
static NOT_USED_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)not used at present").unwrap());

/// Callout announced by a leading word and separator ("Note:", "Example -").
/// The marker becomes the title and is cut from the text.
pub struct PrefixCalloutRule {
    name: &'static str,
    title: &'static str,
    tone: CalloutTone,
    prefix: &'static LazyLock<Regex>,
}

impl PrefixCalloutRule {
    pub fn note() -> Self {
        Self {
            name: "NoteCallout",
            title: "Note",
            tone: CalloutTone::Note,
            prefix: &NOTE_PREFIX,
        }
    }

    pub fn example() -> Self {
        Self {
            name: "ExampleCallout",
            title: "Example",
            tone: CalloutTone::Info,
            prefix: &EXAMPLE_PREFIX,
        }
    }
}

impl BlockRule for PrefixCalloutRule {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, fragment: &RawFragment) -> bool {
        fragment
            .paragraph_text()
            .is_some_and(|text| self.prefix.is_match(text))
    }

    fn apply(&self, fragments: &[RawFragment]) -> RuleOutput {
        let text = fragments[0].paragraph_text().unwrap_or_default();
        RuleOutput::single(Block::Callout {
            tone: self.tone,
            title: Some(self.title.to_string()),
            text: self.prefix.replace(text, "").to_string(),
        })
    }
}

/// Untitled callout triggered by a phrase anywhere in the text. Keeps the
/// full text.
pub struct PhraseCalloutRule {
    name: &'static str,
    tone: CalloutTone,
    phrase: &'static LazyLock<Regex>,
}

impl PhraseCalloutRule {
    pub fn unavailable() -> Self {
        Self {
            name: "UnavailableCallout",
            tone: CalloutTone::Warn,
            phrase: &UNAVAILABLE_PHRASE,
        }
    }

    pub fn not_used() -> Self {
        Self {
            name: "NotUsedCallout",
            tone: CalloutTone::Muted,
            phrase: &NOT_USED_PHRASE,
        }
    }
}

impl BlockRule for PhraseCalloutRule {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, fragment: &RawFragment) -> bool {
        fragment
            .paragraph_text()
            .is_some_and(|text| self.phrase.is_match(text))
    }

    fn apply(&self, fragments: &[RawFragment]) -> RuleOutput {
        let text = fragments[0].paragraph_text().unwrap_or_default();
        RuleOutput::single(Block::Callout {
            tone: self.tone,
            title: None,
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn para(text: &str) -> RawFragment {
        RawFragment::Paragraph(text.to_string())
    }

    #[rstest]
    #[case("Note: Only for LD.", "Only for LD.")]
    #[case("NOTE - upper case works", "upper case works")]
    #[case("note– en dash", "en dash")]
    #[case("  Note :spaced", "spaced")]
    fn test_note_strips_marker(#[case] text: &str, #[case] remainder: &str) {
        let rule = PrefixCalloutRule::note();
        assert!(rule.matches(&para(text)));
        assert_eq!(
            rule.apply(&[para(text)]).blocks,
            vec![Block::Callout {
                tone: CalloutTone::Note,
                title: Some("Note".to_string()),
                text: remainder.to_string(),
            }]
        );
    }

    #[test]
    fn test_example_is_info_tone() {
        let rule = PrefixCalloutRule::example();
        let output = rule.apply(&[para("Example: 1000.00")]);
        assert_eq!(
            output.blocks,
            vec![Block::Callout {
                tone: CalloutTone::Info,
                title: Some("Example".to_string()),
                text: "1000.00".to_string(),
            }]
        );
        assert_eq!(output.consumed, 1);
    }

    #[rstest]
    #[case("Notes are kept")]
    #[case("Noteworthy: not a note")]
    #[case("See note: below")]
    fn test_note_requires_leading_marker(#[case] text: &str) {
        assert!(!PrefixCalloutRule::note().matches(&para(text)));
    }

    #[test]
    fn test_unavailable_keeps_full_text() {
        let text = "Help text for this field is currently unavailable.";
        let rule = PhraseCalloutRule::unavailable();
        assert!(rule.matches(&para(text)));
        assert_eq!(
            rule.apply(&[para(text)]).blocks,
            vec![Block::Callout {
                tone: CalloutTone::Warn,
                title: None,
                text: text.to_string(),
            }]
        );
    }

    #[test]
    fn test_not_used_matches_anywhere() {
        let rule = PhraseCalloutRule::not_used();
        assert!(rule.matches(&para("This field is NOT USED AT PRESENT.")));
        assert!(!rule.matches(&para("Used at present.")));
    }

    #[test]
    fn test_tables_never_match() {
        let table = RawFragment::Table("<table>Note: x</table>".to_string());
        assert!(!PrefixCalloutRule::note().matches(&table));
        assert!(!PhraseCalloutRule::not_used().matches(&table));
    }
}
