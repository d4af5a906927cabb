//! Error types for the parser façade.

use hdm_core::DecodeError;
use hdm_schema::FormatError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for opening and parsing HDM files.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Header or schema is malformed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Payload does not match the schema.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// `parse_message` was already called on this parser.
    #[error("message already parsed; open a new parser to decode again")]
    AlreadyParsed,
}

impl ParserError {
    /// Returns true for file access errors.
    #[must_use]
    pub const fn is_file_access(&self) -> bool {
        matches!(self, Self::FileAccess { .. })
    }

    /// Returns true for header and schema errors.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns true for payload errors.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;
