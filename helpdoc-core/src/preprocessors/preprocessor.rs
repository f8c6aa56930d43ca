// Preprocessor abstraction for document ingestion
//
// This module defines the boundary between markup handling (raw text -> ExtractedDocument)
// and structuring (ExtractedDocument -> DocumentModel). Everything after this point works
// with raw fragments and is independent of the markup dialect.

use crate::error::ParseResult;
use crate::types::{ExtractedDocument, SourceInfo};
use std::path::Path;

/// Preprocessor trait - converts markup text into raw entries
///
/// Preprocessors handle:
/// - Markup parsing and well-formedness
/// - Locating header, overview and entry records
/// - Raw paragraph/table fragment extraction
pub trait Preprocessor {
    /// Parse already-materialized markup into header, overview and raw entries.
    ///
    /// Fails only when the text is not well-formed markup.
    fn parse_markup(&self, markup: &str) -> ParseResult<ExtractedDocument>;

    /// Acquire the text of `input` along with its source info.
    ///
    /// Errors here are I/O errors, never malformed input.
    fn read_source(&self, input: &Path) -> ParseResult<(String, SourceInfo)> {
        let text = std::fs::read_to_string(input)?;
        let name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let source = SourceInfo::new(name, text.len() as u64);
        Ok((text, source))
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}
