//! Error types for payload decoding.

use thiserror::Error;

/// Error raised while walking the binary payload.
///
/// Any of these aborts the in-progress decode; no partial value tree is
/// handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read would run past the end of the payload.
    #[error(
        "buffer too short at offset {offset}: required {required} bytes, available {available} bytes"
    )]
    BufferTooShort {
        /// Cursor offset where the read was attempted.
        offset: usize,
        /// Bytes the read needed.
        required: usize,
        /// Bytes left in the payload.
        available: usize,
    },

    /// A type reference does not name any type in the schema.
    #[error("unknown type '{name}'")]
    UnknownType {
        /// Referenced type name.
        name: String,
    },

    /// A type was used where a different kind of type is required.
    #[error("type '{name}' is not {expected}")]
    UnexpectedType {
        /// Type name.
        name: String,
        /// Kind the caller needed.
        expected: &'static str,
    },

    /// A sibling field referenced by a condition or size was not decoded
    /// earlier in the same object, or was itself skipped.
    #[error("field '{field}' referenced in '{object}' is not available")]
    UnresolvedField {
        /// Referenced sibling field.
        field: String,
        /// Object type doing the lookup.
        object: String,
    },

    /// A size resolved to something that is not a non-negative integer.
    #[error("invalid size for '{field}': {value}")]
    InvalidSize {
        /// Field whose size was being resolved.
        field: String,
        /// Offending value, rendered for diagnostics.
        value: String,
    },

    /// A list or vector entry has no size in its layout entry or its type.
    #[error("no size given for sequence field '{field}'")]
    MissingSize {
        /// Field being decoded.
        field: String,
    },

    /// Raw integer does not map to any enum member.
    #[error("invalid value {value} for enum '{type_name}'")]
    InvalidEnumValue {
        /// Enum type name.
        type_name: String,
        /// Raw value read.
        value: i64,
    },

    /// A condition tested a flag the flag type does not define.
    #[error("flag '{flag}' is not defined by '{type_name}'")]
    UnknownFlag {
        /// Flag type name.
        type_name: String,
        /// Requested flag name.
        flag: String,
    },

    /// Nested objects exceeded the configured recursion limit.
    #[error("maximum nesting depth {max_depth} exceeded")]
    DepthExceeded {
        /// Configured limit.
        max_depth: usize,
    },

    /// A sequence of elements that occupy no payload bytes asked for more
    /// elements than the configured limit.
    #[error("{count} elements of '{type_name}' exceed the limit of {max_elements}")]
    TooManyElements {
        /// Element type name.
        type_name: String,
        /// Requested element count.
        count: usize,
        /// Configured limit.
        max_elements: usize,
    },
}

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
