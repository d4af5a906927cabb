//! The parser façade: one file, one schema, one decode.

use crate::builder::{DecodeOptions, ParserBuilder};
use crate::error::{ParserError, Result};
use crate::materializer::Materializer;
use hdm_core::ParsedObject;
use hdm_schema::{Schema, build_schema, read_header};
use std::path::Path;

/// Reader for a single HDM file.
///
/// Construction reads the file and compiles its header into a [`Schema`].
/// [`Parser::parse_message`] then decodes the payload once.
#[derive(Debug)]
pub struct Parser {
    schema: Schema,
    payload: Vec<u8>,
    options: DecodeOptions,
    position: usize,
    parsed: bool,
}

impl Parser {
    /// Opens the file at `path` with default options.
    ///
    /// # Errors
    /// Returns [`ParserError::FileAccess`] if the file cannot be read and
    /// [`ParserError::Format`] if its header is malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        ParserBuilder::new().open(path)
    }

    /// Prepares an in-memory file image with default options.
    ///
    /// # Errors
    /// Returns [`ParserError::Format`] if the header is malformed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::with_options(bytes, DecodeOptions::default())
    }

    pub(crate) fn with_options(bytes: Vec<u8>, options: DecodeOptions) -> Result<Self> {
        let (header, payload) = read_header(bytes)?;
        let schema = build_schema(&header)?;
        Ok(Self {
            schema,
            payload,
            options,
            position: 0,
            parsed: false,
        })
    }

    /// Returns the compiled schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Returns the payload offset reached by the last decode. On failure
    /// this is the offset of the read that failed.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of payload bytes past [`Parser::position`].
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.payload.len().saturating_sub(self.position)
    }

    /// Returns true once [`Parser::parse_message`] has been called.
    #[must_use]
    pub const fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Returns the decode options in effect.
    #[must_use]
    pub const fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decodes the root message from the payload.
    ///
    /// # Errors
    /// Returns [`ParserError::AlreadyParsed`] on a second call and
    /// [`ParserError::Decode`] if the payload does not match the schema.
    pub fn parse_message(&mut self) -> Result<ParsedObject> {
        if self.parsed {
            return Err(ParserError::AlreadyParsed);
        }
        self.parsed = true;

        let mut materializer = Materializer::new(&self.schema, &self.payload, self.options);
        let result = materializer.decode_root();
        self.position = materializer.position();

        let message = result?;
        let trailing = self.remaining();
        if trailing > 0 {
            tracing::warn!(
                message_type = %self.schema.message_type,
                trailing,
                "payload has bytes past the decoded message"
            );
        }
        tracing::debug!(
            message_type = %self.schema.message_type,
            consumed = self.position,
            "parsed message"
        );
        Ok(message)
    }
}
