//! Document Preprocessors
//!
//! This module provides the markup layer: converting raw document text into an
//! `ExtractedDocument` that feeds the model builder.
//!
//! ## Architecture
//!
//! ```text
//! Raw markup text
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! ExtractedDocument (header, overview, raw fragments per entry)
//!     ↓
//! [ModelBuilder + RuleEngine]
//!     ↓
//! DocumentModel
//! ```
//!
//! ## Available Preprocessors
//!
//! - `T24HelpPreprocessor` - `t24help` XML field-help documents

pub mod preprocessor;
pub mod xml;

// Re-export main types
pub use preprocessor::Preprocessor;
pub use xml::T24HelpPreprocessor;
