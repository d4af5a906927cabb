//! Error types for header reading and schema compilation.

use thiserror::Error;

/// Error raised while reading the header or compiling its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The `#header end` sentinel was not found.
    #[error("header end sentinel not found")]
    MissingSentinel,

    /// Header text is not valid UTF-8.
    #[error("header is not valid UTF-8 at byte {valid_up_to}")]
    Utf8 {
        /// Length of the valid prefix.
        valid_up_to: usize,
    },

    /// Header text is not a well-formed literal.
    #[error("malformed header literal at offset {offset}: {message}")]
    Literal {
        /// Byte offset in the comment-stripped header text.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// Missing required key.
    #[error("missing required key '{key}' in {context}")]
    MissingKey {
        /// Where the key was expected.
        context: String,
        /// Key name.
        key: String,
    },

    /// Key present with the wrong kind or an unusable value.
    #[error("invalid value for '{key}' in {context}: expected {expected}, found {found}")]
    InvalidValue {
        /// Where the key was found.
        context: String,
        /// Key name.
        key: String,
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// Descriptor `type` tag is not one of the known kinds.
    #[error("unknown type tag '{tag}' for type '{type_name}'")]
    UnknownTypeTag {
        /// Type being compiled.
        type_name: String,
        /// Offending tag.
        tag: String,
    },

    /// Byte width not supported for the type kind.
    #[error("unsupported {kind} width {width} for type '{type_name}'")]
    UnsupportedWidth {
        /// Type being compiled.
        type_name: String,
        /// Type kind (int, float, ...).
        kind: String,
        /// Offending width.
        width: i64,
    },
}

impl FormatError {
    /// Creates a missing key error.
    pub fn missing_key(context: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            context: context.into(),
            key: key.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(
        context: impl Into<String>,
        key: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            context: context.into(),
            key: key.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a literal syntax error.
    pub fn literal(offset: usize, message: impl Into<String>) -> Self {
        Self::Literal {
            offset,
            message: message.into(),
        }
    }
}
