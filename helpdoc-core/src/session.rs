use crate::processor::{DocumentProcessor, LoadedDocument};
use crate::types::{DocumentModel, SourceInfo};
use anyhow::Result;
use std::path::Path;

/// Holds the currently loaded document, if any.
///
/// A load either replaces the current document wholesale or, on failure,
/// leaves it exactly as it was.
pub struct DocumentSession {
    processor: DocumentProcessor,
    current: Option<LoadedDocument>,
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new(DocumentProcessor::default())
    }
}

impl DocumentSession {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self {
            processor,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&LoadedDocument> {
        self.current.as_ref()
    }

    pub fn model(&self) -> Option<&DocumentModel> {
        self.current.as_ref().map(|doc| &doc.model)
    }

    /// Parse `text` and make it the current document.
    pub fn load(&mut self, text: &str, source: SourceInfo) -> Result<&LoadedDocument> {
        let loaded = self.processor.load_text(text, source)?;
        Ok(self.replace(loaded))
    }

    pub fn load_file(&mut self, path: &Path) -> Result<&LoadedDocument> {
        let loaded = self.processor.process_file(path)?;
        Ok(self.replace(loaded))
    }

    /// Drop the current document.
    pub fn clear(&mut self) {
        self.current = None;
    }

    fn replace(&mut self, loaded: LoadedDocument) -> &LoadedDocument {
        if let Some(previous) = &self.current {
            log::debug!("Replacing loaded document {}", previous.source.name);
        }
        self.current.insert(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const FIRST: &str = "<t24help><header><product>LD</product></header>\
        <menu><t><field>F1</field><desc><p>x</p></desc></t></menu></t24help>";
    const SECOND: &str = "<t24help><header><product>MM</product></header></t24help>";

    #[test]
    fn test_load_replaces_current() {
        let mut session = DocumentSession::default();
        assert!(session.model().is_none());

        session.load(FIRST, SourceInfo::inline(FIRST)).unwrap();
        assert_eq!(session.model().unwrap().product, "LD");

        session.load(SECOND, SourceInfo::new("second.xml", 10)).unwrap();
        let current = session.current().unwrap();
        assert_eq!(current.model.product, "MM");
        assert!(current.model.entries.is_empty());
        assert_eq!(current.source.name, "second.xml");
    }

    #[test]
    fn test_failed_load_keeps_previous_document() {
        let mut session = DocumentSession::default();
        session.load(FIRST, SourceInfo::inline(FIRST)).unwrap();

        let err = session
            .load("not markup at all", SourceInfo::new("bad.xml", 17))
            .unwrap_err();
        assert!(err.downcast_ref::<ParseError>().unwrap().is_malformed_input());
        assert!(err.to_string().contains("bad.xml"));

        let model = session.model().unwrap();
        assert_eq!(model.product, "LD");
        assert_eq!(model.entries.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut session = DocumentSession::default();
        session.load(FIRST, SourceInfo::inline(FIRST)).unwrap();
        session.clear();
        assert!(session.current().is_none());
    }
}
