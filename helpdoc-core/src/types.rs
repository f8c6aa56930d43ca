use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Anchor reserved for the document overview in navigation.
pub const OVERVIEW_ANCHOR: &str = "overview";

/// The schema version stamped on serialized model output.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "0.1.0";

// ===== DOCUMENT MODEL =====
// Built once per successful parse and never mutated afterwards.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Header product code, empty when the header is missing
    pub product: String,
    /// Header table name, empty when the header is missing
    pub table: String,
    pub overview_paragraphs: Vec<String>,
    /// Entries in extraction order (not display order)
    pub entries: Vec<Entry>,
}

impl DocumentModel {
    /// First entry carrying `anchor`, in extraction order.
    pub fn entry_by_anchor(&self, anchor: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.anchor == anchor)
    }

    pub fn obsolete_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.obsolete).count()
    }

    pub fn block_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.blocks.len()).sum()
    }

    /// Human-readable title: "PRODUCT / TABLE", whichever parts exist.
    pub fn title(&self) -> String {
        match (self.product.is_empty(), self.table.is_empty()) {
            (false, false) => format!("{} / {}", self.product, self.table),
            (false, true) => self.product.clone(),
            (true, false) => self.table.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    /// Slug of `label`; not guaranteed unique across entries
    pub anchor: String,
    /// Normalized paragraph text, flat legacy view
    pub paragraphs: Vec<String>,
    /// Structured view
    pub blocks: Vec<Block>,
    pub obsolete: bool,
    /// Indexes into `paragraphs` holding a "Validation Rules" heading line
    pub rule_section_indexes: BTreeSet<usize>,
}

impl Entry {
    pub fn has_rule_section(&self) -> bool {
        !self.rule_section_indexes.is_empty()
    }
}

// ===== BLOCKS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutTone {
    Info,
    Note,
    Warn,
    Muted,
}

impl CalloutTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutTone::Info => "info",
            CalloutTone::Note => "note",
            CalloutTone::Warn => "warn",
            CalloutTone::Muted => "muted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: String,
    },
    Heading {
        text: String,
    },
    List {
        items: Vec<String>,
    },
    Callout {
        tone: CalloutTone,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        text: String,
    },
    /// Embedded table markup, passed through byte for byte
    Table {
        raw_markup: String,
    },
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::List { .. } => "list",
            Block::Callout { .. } => "callout",
            Block::Table { .. } => "table",
        }
    }

    /// Prose carried by the block, decoration stripped. Tables carry none.
    pub fn text_content(&self) -> Vec<&str> {
        match self {
            Block::Paragraph { text } | Block::Heading { text } => vec![text.as_str()],
            Block::List { items } => items.iter().map(String::as_str).collect(),
            Block::Callout { text, .. } => vec![text.as_str()],
            Block::Table { .. } => Vec::new(),
        }
    }
}

// ===== RAW FRAGMENTS =====
// What the extractor hands to the block structurer.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RawFragment {
    /// Normalized paragraph text
    Paragraph(String),
    /// Verbatim table markup
    Table(String),
}

impl RawFragment {
    pub fn paragraph_text(&self) -> Option<&str> {
        match self {
            RawFragment::Paragraph(text) => Some(text),
            RawFragment::Table(_) => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, RawFragment::Table(_))
    }
}

/// One field record as it comes out of the markup, before structuring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntry {
    pub label: String,
    pub fragments: Vec<RawFragment>,
    /// Whether the fragments came from the deep-search fallback pass
    pub used_fallback: bool,
}

/// Preprocessor output: header, overview and raw entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub product: String,
    pub table: String,
    pub overview_paragraphs: Vec<String>,
    pub entries: Vec<ExtractedEntry>,
}

// ===== SOURCE =====

/// Where a document's text came from, as reported by the acquisition layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub size_bytes: u64,
}

impl SourceInfo {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }

    /// Source info for text that never touched a file.
    pub fn inline(text: &str) -> Self {
        Self::new("<inline>", text.len() as u64)
    }
}
