//! Built-in sanity checks over the pipeline, runnable from the CLI.

use crate::processor::DocumentProcessor;
use crate::text::slugify;
use crate::types::Block;
use serde::Serialize;

const MINIMAL_DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<t24help>
  <header><product>LD</product><table>PM.LD.PARAM</table></header>
  <overview><ovdesc><p>Intro</p></ovdesc></overview>
  <menu>
    <t><field>F1</field><desc><p>Validation Rules:</p><p>Must be A</p></desc></t>
    <t><field>F2</field><desc><p>This field is obsolete.</p></desc></t>
  </menu>
</t24help>"#;

// Heading sits inside a stray wrapper paragraph
const NESTED_RULES_DOCUMENT: &str = "<t24help><menu><t><field>F3</field><desc>\
    <p><p>Validation Rules:</p></p><p>Line1</p><p>Line2</p>\
    </desc></t></menu></t24help>";

#[derive(Debug, Clone, Serialize)]
pub struct SelfCheck {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl SelfCheck {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

pub fn run_self_checks() -> Vec<SelfCheck> {
    let processor = DocumentProcessor::default();
    vec![
        check_slug(),
        check_minimal_document(&processor),
        check_nested_rules_heading(&processor),
    ]
}

pub fn all_passed(checks: &[SelfCheck]) -> bool {
    checks.iter().all(|check| check.passed)
}

fn check_slug() -> SelfCheck {
    let slug = slugify("POS.FWD.VAR.INT");
    SelfCheck::new("slugify", slug == "pos-fwd-var-int", format!("got '{slug}'"))
}

fn check_minimal_document(processor: &DocumentProcessor) -> SelfCheck {
    let name = "header, entries and obsolete flag";
    match processor.process_markup(MINIMAL_DOCUMENT) {
        Ok(model) => {
            let passed = model.product == "LD"
                && model.table == "PM.LD.PARAM"
                && model.entries.len() == 2
                && model.entries.get(1).is_some_and(|e| e.obsolete);
            SelfCheck::new(
                name,
                passed,
                format!(
                    "{} entries, {} obsolete, header '{}'",
                    model.entries.len(),
                    model.obsolete_count(),
                    model.title()
                ),
            )
        }
        Err(err) => SelfCheck::new(name, false, err.to_string()),
    }
}

fn check_nested_rules_heading(processor: &DocumentProcessor) -> SelfCheck {
    let name = "nested validation-rules heading";
    match processor.process_markup(NESTED_RULES_DOCUMENT) {
        Ok(model) => {
            let entry = model.entries.first();
            let has_heading = entry.is_some_and(|e| {
                e.blocks
                    .iter()
                    .any(|block| matches!(block, Block::Heading { .. }))
            });
            let indexed = entry.is_some_and(|e| e.has_rule_section());
            SelfCheck::new(
                name,
                has_heading && indexed,
                format!("heading block: {has_heading}, rule index: {indexed}"),
            )
        }
        Err(err) => SelfCheck::new(name, false, err.to_string()),
    }
}
