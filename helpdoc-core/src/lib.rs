// Helpdoc Core Library
//
// Turns t24help field-help XML into a navigable document model.
// Main interface for parsing, structuring, ordering and searching help entries.

pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod query;
pub mod rules;
pub mod serialization;
pub mod session;
pub mod text;
pub mod types;

// Re-export main types and functions for easy use
pub use builder::ModelBuilder;
pub use config::ParsingConfig;
pub use error::{ParseError, ParseResult};
pub use preprocessors::{Preprocessor, T24HelpPreprocessor};
pub use processor::{DocumentProcessor, LoadedDocument};
pub use serialization::OutputFormat;
pub use session::DocumentSession;
pub use text::{normalize, slugify};
pub use types::*;

/// Parse one help document with the default configuration.
///
/// Fails only when `raw` is not well-formed markup.
pub fn extract(raw: &str) -> ParseResult<DocumentModel> {
    let extracted = preprocessors::xml::extract_document(raw)?;
    Ok(ModelBuilder::default().build(extracted))
}
