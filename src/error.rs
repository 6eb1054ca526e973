//! Error types for pdbml
//!
//! This module defines all error types used throughout the library.
//! Only a few of them abort a generation pass; data-quality problems are
//! logged by the writers and the offending unit is skipped.

use std::fmt;
use thiserror::Error;

/// Result type alias using pdbml Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pdbml operations
#[derive(Error, Debug)]
pub enum Error {
    /// A type code that has no XSD counterpart
    #[error("invalid type code: {0}")]
    InvalidTypeCode(String),

    /// A keyref without child fields
    #[error("no child keys for keyref \"{0}\"")]
    EmptyKeyref(String),

    /// A scalar value that does not match its declared type
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// An inline documentation example that could not be rendered
    #[error("example error: {0}")]
    Example(String),

    /// Malformed parent/child relationship
    #[error("relation error: {0}")]
    Relation(String),

    /// Malformed table data
    #[error("table error: {0}")]
    Table(String),

    /// Value error (invalid setting or literal)
    #[error("value error: {0}")]
    Value(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON model loading error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Scalar formatting error with context
///
/// The raw value is kept so that the writer can still pass it through
/// unformatted.
#[derive(Debug, Clone)]
pub struct FormatError {
    /// Error message
    pub message: String,
    /// The offending raw value
    pub value: String,
    /// Item the value belongs to
    pub item: Option<String>,
    /// Underlying reason
    pub reason: Option<String>,
}

impl FormatError {
    /// Create a new format error for a raw value
    pub fn new(message: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: value.into(),
            item: None,
            reason: None,
        }
    }

    /// Set the item the value belongs to
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\"", self.message, self.value)?;

        if let Some(ref item) = self.item {
            write!(f, "\n\nItem: {}", item)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for FormatError {}
