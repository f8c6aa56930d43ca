use crate::query::order;
use crate::types::*;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Whole model as pretty JSON
    #[default]
    Model,
    /// Plain-text rendering in display order
    Outline,
    /// Per-entry paragraph lists, no blocks
    Flat,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Model => "model",
            OutputFormat::Outline => "outline",
            OutputFormat::Flat => "flat",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Outline => "txt",
            OutputFormat::Model | OutputFormat::Flat => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "model" => Ok(OutputFormat::Model),
            "outline" => Ok(OutputFormat::Outline),
            "flat" => Ok(OutputFormat::Flat),
            other => bail!("Unknown output format: {other} (expected model, outline or flat)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub schema_version: String,
    pub format: String,
    pub model: DocumentModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatDocument {
    pub format: String,
    pub product: String,
    pub table: String,
    pub overview_paragraphs: Vec<String>,
    pub entries: Vec<FlatEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub label: String,
    pub anchor: String,
    pub obsolete: bool,
    pub paragraphs: Vec<String>,
}

impl DocumentModel {
    pub fn to_model_document(&self) -> ModelDocument {
        ModelDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            format: OutputFormat::Model.as_str().to_string(),
            model: self.clone(),
        }
    }

    /// Read back the output of the `model` format.
    pub fn from_model_json(json: &str) -> Result<Self> {
        let document: ModelDocument = serde_json::from_str(json)?;
        if document.schema_version != SCHEMA_VERSION {
            log::warn!(
                "Model written with schema {}, reading as {}",
                document.schema_version,
                SCHEMA_VERSION
            );
        }
        Ok(document.model)
    }

    pub fn to_flat_format(&self) -> FlatDocument {
        let entries = self
            .entries
            .iter()
            .map(|entry| FlatEntry {
                label: entry.label.clone(),
                anchor: entry.anchor.clone(),
                obsolete: entry.obsolete,
                paragraphs: entry.paragraphs.clone(),
            })
            .collect();

        FlatDocument {
            format: OutputFormat::Flat.as_str().to_string(),
            product: self.product.clone(),
            table: self.table.clone(),
            overview_paragraphs: self.overview_paragraphs.clone(),
            entries,
        }
    }

    /// Plain-text outline: header, overview, then every entry in display order.
    pub fn to_outline(&self) -> String {
        let mut out = String::new();

        let title = self.title();
        if !title.is_empty() {
            push_underlined(&mut out, &title, '=');
        }

        if !self.overview_paragraphs.is_empty() {
            push_underlined(&mut out, "Overview", '-');
            for paragraph in &self.overview_paragraphs {
                let _ = writeln!(out, "{paragraph}\n");
            }
        }

        for entry in order(&self.entries) {
            let label = if entry.obsolete {
                format!("{} [obsolete]", entry.label)
            } else {
                entry.label.clone()
            };
            push_underlined(&mut out, &label, '-');
            for block in &entry.blocks {
                render_block(&mut out, block);
            }
        }

        out
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let rendered = match format {
            OutputFormat::Model => serde_json::to_string_pretty(&self.to_model_document())?,
            OutputFormat::Flat => serde_json::to_string_pretty(&self.to_flat_format())?,
            OutputFormat::Outline => self.to_outline(),
        };
        Ok(rendered)
    }

    pub fn save_with_format(&self, path: &str, format: OutputFormat) -> Result<()> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

fn push_underlined(out: &mut String, text: &str, rule: char) {
    let width = text.chars().count();
    let _ = writeln!(out, "{text}");
    let _ = writeln!(out, "{}\n", rule.to_string().repeat(width));
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph { text } => {
            let _ = writeln!(out, "{text}\n");
        }
        Block::Heading { text } => push_underlined(out, text, '~'),
        Block::List { items } => {
            for item in items {
                let _ = writeln!(out, "- {item}");
            }
            out.push('\n');
        }
        Block::Callout { tone, title, text } => {
            let tag = title.as_deref().unwrap_or(tone.as_str());
            let _ = writeln!(out, "[{tag}] {text}\n");
        }
        Block::Table { raw_markup } => {
            let _ = writeln!(out, "{raw_markup}\n");
        }
    }
}
