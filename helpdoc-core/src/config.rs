use crate::error::ParseError;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_short_item_max_chars() -> usize {
    60 // Lines shorter than this after a rules heading are folded into the rule list
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Sentence-continuation merge (structuring pass 1)
    #[serde(default)]
    pub continuation: ContinuationConfig,
    /// Validation-rules list grouping
    #[serde(default)]
    pub rule_list: RuleListConfig,
    /// Pipeline configuration - which classification rules are switched on
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Minimal parse mode - skips classification, every fragment stays a paragraph or table
    #[serde(default)]
    pub minimal_parse: bool,
    /// Log anchor collisions and other model issues after each parse
    #[serde(default = "default_true")]
    pub report_anchor_collisions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationConfig {
    /// Whether split sentences are rejoined before classification
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ContinuationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleListConfig {
    /// Fragments under this many characters keep a validation-rules list going.
    /// Approximate: a short unrelated line right after the list gets absorbed.
    #[serde(default = "default_short_item_max_chars")]
    pub short_item_max_chars: usize,
}

impl Default for RuleListConfig {
    fn default() -> Self {
        Self {
            short_item_max_chars: default_short_item_max_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rule switches. Evaluation order is fixed by the engine, not by this list.
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleConfig {
    fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

/// Classification rule names, in precedence order.
pub const RULE_NAMES: [&str; 7] = [
    "Table",
    "ValidationRules",
    "NoteCallout",
    "ExampleCallout",
    "UnavailableCallout",
    "NotUsedCallout",
    "ListDetection",
];

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: RULE_NAMES.iter().map(|name| RuleConfig::enabled(name)).collect(),
        }
    }
}

impl PipelineConfig {
    /// Rules not mentioned in the config are on.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.name == name)
            .map(|rule| rule.enabled)
            .unwrap_or(true)
    }

    /// Configured names the engine does not know about.
    pub fn unknown_rules(&self) -> Vec<&str> {
        self.rules
            .iter()
            .map(|rule| rule.name.as_str())
            .filter(|name| !RULE_NAMES.contains(name))
            .collect()
    }
}

impl ParsingConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ParseError> {
        let config: ParsingConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|err| {
                log::warn!("Failed to load config from {p} ({err}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ParseError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            continuation: ContinuationConfig::default(),
            rule_list: RuleListConfig::default(),
            pipeline: PipelineConfig::default(),
            minimal_parse: false,
            report_anchor_collisions: true,
        }
    }
}
