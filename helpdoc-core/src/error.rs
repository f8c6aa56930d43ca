//! Error types for helpdoc-core.

use std::io;
use thiserror::Error;

/// Result type alias for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors the ingestion pipeline can surface.
///
/// Only `MalformedInput` comes out of the parsing core itself; everything
/// else the core encounters (missing header, empty descriptions, blank
/// labels) degrades to empty values instead of failing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text could not be parsed as well-formed markup at all.
    #[error("Invalid XML file: {0}")]
    MalformedInput(String),

    /// I/O error while acquiring the input text.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be read or decoded.
    #[error("Config error: {0}")]
    Config(String),
}

impl ParseError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ParseError::MalformedInput(message.into())
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, ParseError::MalformedInput(_))
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        ParseError::Config(err.to_string())
    }
}
