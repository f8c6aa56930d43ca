use crate::types::DocumentModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ModelValidator - consistency checks over a finished document model.
// Reports only; the model is never touched.
pub struct ModelValidator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub quality_score: f32,
    pub total_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Several labels slug to the same anchor. Lookups resolve to the first.
    AnchorCollision { anchor: String, labels: Vec<String> },
    EmptyEntry { label: String },
    /// Label with no ASCII letters or digits, so its anchor is empty
    EmptyAnchor { label: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::AnchorCollision { anchor, labels } => write!(
                f,
                "anchor '{anchor}' shared by {} entries: {}",
                labels.len(),
                labels.join(", ")
            ),
            ValidationIssue::EmptyEntry { label } => {
                write!(f, "entry '{label}' has no content")
            }
            ValidationIssue::EmptyAnchor { label } => {
                write!(f, "entry '{label}' has an empty anchor")
            }
        }
    }
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn anchor_collisions(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, ValidationIssue::AnchorCollision { .. }))
    }

    /// Log every issue at warn level.
    pub fn log_issues(&self) {
        for issue in &self.issues {
            log::warn!("Model check: {issue}");
        }
    }
}

impl ModelValidator {
    pub fn validate(model: &DocumentModel) -> ValidationReport {
        let mut issues = Vec::new();
        let total_entries = model.entries.len();

        // 1. Anchors shared by more than one entry
        Self::validate_anchor_uniqueness(model, &mut issues);

        // 2. Entries that carry nothing to show
        for entry in &model.entries {
            if entry.anchor.is_empty() {
                issues.push(ValidationIssue::EmptyAnchor {
                    label: entry.label.clone(),
                });
            }
            if entry.paragraphs.is_empty() && entry.blocks.is_empty() {
                issues.push(ValidationIssue::EmptyEntry {
                    label: entry.label.clone(),
                });
            }
        }

        // 1.0 = clean, drops with issues per entry
        let quality_score = if total_entries == 0 {
            1.0
        } else {
            (1.0 - (issues.len() as f32 / total_entries as f32)).max(0.0)
        };

        ValidationReport {
            issues,
            quality_score,
            total_entries,
        }
    }

    fn validate_anchor_uniqueness(model: &DocumentModel, issues: &mut Vec<ValidationIssue>) {
        // BTreeMap keeps the report order deterministic
        let mut by_anchor: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for entry in model.entries.iter().filter(|e| !e.anchor.is_empty()) {
            by_anchor
                .entry(entry.anchor.as_str())
                .or_default()
                .push(entry.label.clone());
        }

        for (anchor, labels) in by_anchor {
            if labels.len() > 1 {
                issues.push(ValidationIssue::AnchorCollision {
                    anchor: anchor.to_string(),
                    labels,
                });
            }
        }
    }
}
