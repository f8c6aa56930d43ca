//! XML Preprocessor
//!
//! Reads `t24help` field-help documents: builds a span-carrying element tree
//! with quick-xml, then extracts header, overview and per-entry fragments.

pub mod extractor;
pub mod tree;

use crate::error::ParseResult;
use crate::preprocessors::preprocessor::Preprocessor;
use crate::types::ExtractedDocument;
use std::path::Path;

pub use extractor::{extract_document, PLACEHOLDER_PARAGRAPH};
pub use tree::XmlTree;

#[derive(Debug, Clone, Copy, Default)]
pub struct T24HelpPreprocessor;

impl T24HelpPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for T24HelpPreprocessor {
    fn parse_markup(&self, markup: &str) -> ParseResult<ExtractedDocument> {
        extract_document(markup)
    }

    fn name(&self) -> &str {
        "t24help-xml"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("xml"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_xml_only() {
        let preprocessor = T24HelpPreprocessor::new();
        assert!(preprocessor.supports_file_type(Path::new("help/PM.LD.PARAM.XML")));
        assert!(preprocessor.supports_file_type(Path::new("a.xml")));
        assert!(!preprocessor.supports_file_type(Path::new("a.json")));
        assert!(!preprocessor.supports_file_type(Path::new("noext")));
    }
}
