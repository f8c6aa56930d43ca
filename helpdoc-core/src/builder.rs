use crate::config::ParsingConfig;
use crate::rules::section_detection::is_rule_section_line;
use crate::rules::RuleEngine;
use crate::text::slugify;
use crate::types::*;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static OBSOLETE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bobsolete\b").unwrap());

/// Whole-word, case-insensitive "obsolete".
pub fn mentions_obsolete(text: &str) -> bool {
    OBSOLETE_WORD.is_match(text)
}

/// Turns extractor output into the final model: derived entry fields plus
/// structured blocks.
pub struct ModelBuilder {
    engine: RuleEngine,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new(&ParsingConfig::default())
    }
}

impl ModelBuilder {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            engine: RuleEngine::new(config),
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn build(&self, extracted: ExtractedDocument) -> DocumentModel {
        log::debug!(
            "Building document model from {} extracted entries",
            extracted.entries.len()
        );

        let entries: Vec<Entry> = extracted
            .entries
            .into_iter()
            .map(|entry| self.build_entry(entry))
            .collect();

        DocumentModel {
            product: extracted.product,
            table: extracted.table,
            overview_paragraphs: extracted.overview_paragraphs,
            entries,
        }
    }

    pub fn build_entry(&self, extracted: ExtractedEntry) -> Entry {
        let paragraphs: Vec<String> = extracted
            .fragments
            .iter()
            .filter_map(RawFragment::paragraph_text)
            .map(str::to_string)
            .collect();

        let obsolete = paragraphs.iter().any(|p| mentions_obsolete(p));
        let rule_section_indexes: BTreeSet<usize> = paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| is_rule_section_line(p))
            .map(|(index, _)| index)
            .collect();

        let blocks = self.engine.structure(&extracted.fragments);

        Entry {
            anchor: slugify(&extracted.label),
            label: extracted.label,
            paragraphs,
            blocks,
            obsolete,
            rule_section_indexes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn extracted(label: &str, fragments: Vec<RawFragment>) -> ExtractedEntry {
        ExtractedEntry {
            label: label.to_string(),
            fragments,
            used_fallback: false,
        }
    }

    fn para(text: &str) -> RawFragment {
        RawFragment::Paragraph(text.to_string())
    }

    #[rstest]
    #[case("This field is obsolete at 14.2.0", true)]
    #[case("OBSOLETE", true)]
    #[case("(obsolete)", true)]
    #[case("Obsoleted in R10", false)]
    #[case("nonobsolete", false)]
    #[case("Current field", false)]
    fn test_mentions_obsolete(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(mentions_obsolete(text), expected);
    }

    #[test]
    fn test_build_entry_derives_fields() {
        let builder = ModelBuilder::default();
        let entry = builder.build_entry(extracted(
            "POS.FWD.VAR.INT",
            vec![
                para("Forward interest."),
                RawFragment::Table("<table/>".to_string()),
                para("Validation Rules:"),
                para("Must be numeric"),
            ],
        ));

        assert_eq!(entry.anchor, "pos-fwd-var-int");
        assert_eq!(
            entry.paragraphs,
            vec!["Forward interest.", "Validation Rules:", "Must be numeric"]
        );
        assert_eq!(entry.rule_section_indexes, BTreeSet::from([1]));
        assert!(!entry.obsolete);
        assert_eq!(entry.blocks.len(), 4);
        assert_eq!(entry.blocks[1].kind(), "table");
    }

    #[test]
    fn test_obsolete_from_any_paragraph() {
        let entry = ModelBuilder::default().build_entry(extracted(
            "F2",
            vec![para("Kept for history."), para("This field is obsolete.")],
        ));
        assert!(entry.obsolete);
    }

    #[test]
    fn test_build_keeps_header_and_order() {
        let doc = ExtractedDocument {
            product: "LD".to_string(),
            table: "PM.LD.PARAM".to_string(),
            overview_paragraphs: vec!["Intro".to_string()],
            entries: vec![extracted("B", vec![]), extracted("A", vec![])],
        };
        let model = ModelBuilder::default().build(doc);
        assert_eq!(model.title(), "LD / PM.LD.PARAM");
        let labels: Vec<&str> = model.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["B", "A"]);
    }
}
