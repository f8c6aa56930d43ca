use crate::text::collapse_whitespace;
use crate::types::RawFragment;
use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[.!?]"?$"#).unwrap());

static LOWERCASE_OR_PAREN_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z(]").unwrap());

static JOINING_WORD_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(and|or|but|so|to|of|for|with|in|on|at|by|the)\b").unwrap()
});

/// `.`, `!` or `?` at the very end, optionally followed by a double quote.
pub fn ends_sentence(text: &str) -> bool {
    SENTENCE_END.is_match(text)
}

pub fn looks_like_continuation(text: &str) -> bool {
    LOWERCASE_OR_PAREN_START.is_match(text) || JOINING_WORD_START.is_match(text)
}

/// Rejoin paragraphs that continue an unfinished sentence.
///
/// A table is never merged into and never merged from; it also ends any chain.
pub fn merge_continuations(fragments: &[RawFragment]) -> Vec<RawFragment> {
    let mut merged: Vec<RawFragment> = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        let RawFragment::Paragraph(text) = fragment else {
            merged.push(fragment.clone());
            continue;
        };

        match merged.last_mut() {
            Some(RawFragment::Paragraph(prev))
                if !ends_sentence(prev) && looks_like_continuation(text) =>
            {
                let joined = collapse_whitespace(&format!("{prev} {text}"));
                *prev = joined;
            }
            _ => merged.push(fragment.clone()),
        }
    }

    merged
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
    #[case("Done.", true)]
    #[case("Really?", true)]
    #[case("Stop!", true)]
    #[case("He said \"go.\"", true)]
    #[case("Validation Rules:", false)]
    #[case("The amount", false)]
    #[case("", false)]
    fn test_ends_sentence(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(ends_sentence(text), expected);
    }

    #[rstest]
    #[case("continues here", true)]
    #[case("(see above)", true)]
    #[case("And then", true)]
    #[case("OR otherwise", true)]
    #[case("The contract", true)]
    #[case("Theory", false)]
    #[case("Must be A", false)]
    #[case("1. first", false)]
    fn test_looks_like_continuation(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(looks_like_continuation(text), expected);
    }

    #[test]
    fn test_chain_of_continuations_collapses_into_one() {
        let merged = merge_continuations(&paras(&["Interest is", "calculated on", "the balance."]));
        assert_eq!(merged, paras(&["Interest is calculated on the balance."]));
    }

    #[test]
    fn test_finished_sentence_is_not_extended() {
        let input = paras(&["First sentence.", "and not joined"]);
        assert_eq!(merge_continuations(&input), input);
    }

    #[test]
    fn test_table_breaks_the_chain() {
        let input = vec![
            RawFragment::Paragraph("Values are".to_string()),
            RawFragment::Table("<table/>".to_string()),
            RawFragment::Paragraph("listed above".to_string()),
        ];
        assert_eq!(merge_continuations(&input), input);
    }

    #[test]
    fn test_first_fragment_is_never_merged() {
        let input = paras(&["lowercase start"]);
        assert_eq!(merge_continuations(&input), input);
    }
}
