//! Parser configuration.

use crate::error::{ParserError, Result};
use crate::parser::Parser;
use std::path::Path;

/// Default limit on nested objects and sequences.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default limit on elements in a sequence whose elements occupy no bytes.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 20;

/// Settings that shape decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Return a bare element instead of a one-element list or vector.
    pub collapse_singletons: bool,
    /// Maximum nesting of objects and sequences.
    pub max_depth: usize,
    /// Maximum element count for sequences of zero-width elements.
    /// Sequences of wider elements are bounded by the payload instead.
    pub max_elements: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            collapse_singletons: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

/// Builder for configuring and creating a parser.
#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    options: DecodeOptions,
}

impl ParserBuilder {
    /// Creates a new parser builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a sequence of exactly one element decodes to the bare
    /// element. Enabled by default.
    #[must_use]
    pub fn collapse_singletons(mut self, enabled: bool) -> Self {
        self.options.collapse_singletons = enabled;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Sets the element limit for sequences whose elements occupy no
    /// payload bytes.
    #[must_use]
    pub fn max_elements(mut self, count: usize) -> Self {
        self.options.max_elements = count;
        self
    }

    /// Returns the options this builder will apply.
    #[must_use]
    pub const fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Reads and prepares the file at `path`.
    ///
    /// # Errors
    /// Returns [`ParserError::FileAccess`] if the file cannot be read and
    /// [`ParserError::Format`] if its header is malformed.
    pub fn open(self, path: impl AsRef<Path>) -> Result<Parser> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ParserError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "opened HDM file");
        Parser::with_options(bytes, self.options)
    }

    /// Prepares an in-memory file image.
    ///
    /// # Errors
    /// Returns [`ParserError::Format`] if the header is malformed.
    pub fn from_bytes(self, bytes: Vec<u8>) -> Result<Parser> {
        Parser::with_options(bytes, self.options)
    }
}
