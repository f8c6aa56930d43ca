use crate::config::{ParsingConfig, RULE_NAMES};
use crate::types::{Block, RawFragment};

use super::callouts::{PhraseCalloutRule, PrefixCalloutRule};
use super::continuation::merge_continuations;
use super::list_detection::ListDetectionRule;
use super::section_detection::ValidationRulesRule;

/// What a rule produced and how many fragments it used up.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutput {
    pub blocks: Vec<Block>,
    pub consumed: usize,
}

impl RuleOutput {
    pub fn single(block: Block) -> Self {
        Self {
            blocks: vec![block],
            consumed: 1,
        }
    }
}

// Classification rule: a pure predicate on the current fragment plus a handler
// that may consume a run of fragments starting there.
pub trait BlockRule {
    fn name(&self) -> &str;

    /// Whether this rule claims `fragment`. Must not look at neighbours.
    fn matches(&self, fragment: &RawFragment) -> bool;

    /// Build blocks from `fragments`, whose first element matched.
    fn apply(&self, fragments: &[RawFragment]) -> RuleOutput;
}

/// Embedded tables pass through untouched.
pub struct TableRule;

impl BlockRule for TableRule {
    fn name(&self) -> &str {
        "Table"
    }

    fn matches(&self, fragment: &RawFragment) -> bool {
        fragment.is_table()
    }

    fn apply(&self, fragments: &[RawFragment]) -> RuleOutput {
        RuleOutput::single(fallback_block(&fragments[0]))
    }
}

/// Block for a fragment no rule claimed.
pub fn fallback_block(fragment: &RawFragment) -> Block {
    match fragment {
        RawFragment::Paragraph(text) => Block::Paragraph { text: text.clone() },
        RawFragment::Table(markup) => Block::Table {
            raw_markup: markup.clone(),
        },
    }
}

/// Turns one entry's raw fragments into blocks.
///
/// Pass 1 rejoins sentences split across paragraphs, pass 2 runs the rule
/// table left to right. Rule precedence is fixed; configuration can only
/// switch rules off.
pub struct RuleEngine {
    rules: Vec<Box<dyn BlockRule>>,
    merge_continuations: bool,
    minimal_parse: bool,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(&ParsingConfig::default())
    }
}

impl RuleEngine {
    pub fn new(config: &ParsingConfig) -> Self {
        for unknown in config.pipeline.unknown_rules() {
            log::warn!("Unknown rule in pipeline config: {unknown}. Skipping...");
        }

        let rules: Vec<Box<dyn BlockRule>> = RULE_NAMES
            .iter()
            .filter(|name| {
                let enabled = config.pipeline.is_enabled(name);
                if !enabled {
                    log::debug!("Skipping disabled rule: {name}");
                }
                enabled
            })
            .filter_map(|name| build_rule(name, config))
            .collect();

        Self {
            rules,
            merge_continuations: config.continuation.enabled,
            minimal_parse: config.minimal_parse,
        }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Full structuring of one entry. Never fails; unclaimed text becomes
    /// `Paragraph`.
    pub fn structure(&self, fragments: &[RawFragment]) -> Vec<Block> {
        if self.minimal_parse {
            return fragments.iter().map(fallback_block).collect();
        }
        let merged = self.merge(fragments);
        self.classify(&merged)
    }

    /// Pass 1 only (identity when continuation merging is off).
    pub fn merge(&self, fragments: &[RawFragment]) -> Vec<RawFragment> {
        if self.merge_continuations && !self.minimal_parse {
            merge_continuations(fragments)
        } else {
            fragments.to_vec()
        }
    }

    /// Pass 2 over already merged fragments.
    pub fn classify(&self, fragments: &[RawFragment]) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(fragments.len());
        let mut index = 0;

        while index < fragments.len() {
            let fragment = &fragments[index];
            match self.rules.iter().find(|rule| rule.matches(fragment)) {
                Some(rule) => {
                    let output = rule.apply(&fragments[index..]);
                    blocks.extend(output.blocks);
                    index += output.consumed.max(1);
                }
                None => {
                    blocks.push(fallback_block(fragment));
                    index += 1;
                }
            }
        }

        blocks
    }
}

fn build_rule(name: &str, config: &ParsingConfig) -> Option<Box<dyn BlockRule>> {
    let rule: Box<dyn BlockRule> = match name {
        "Table" => Box::new(TableRule),
        "ValidationRules" => Box::new(ValidationRulesRule::new(
            config.rule_list.short_item_max_chars,
        )),
        "NoteCallout" => Box::new(PrefixCalloutRule::note()),
        "ExampleCallout" => Box::new(PrefixCalloutRule::example()),
        "UnavailableCallout" => Box::new(PhraseCalloutRule::unavailable()),
        "NotUsedCallout" => Box::new(PhraseCalloutRule::not_used()),
        "ListDetection" => Box::new(ListDetectionRule),
        _ => return None,
    };
    Some(rule)
}
