//! File header reading.
//!
//! An HDM file is laid out as
//!
//! ```text
//! [header text] #header end\n [binary payload]
//! ```
//!
//! The header text is UTF-8. Lines starting with `#` are comments; what
//! remains is one literal dict with a `"types"` map and a `"message"`
//! descriptor naming the root type.

use crate::error::FormatError;
use crate::literal::{Literal, parse_literal};

/// Marker separating header text from the binary payload.
pub const HEADER_SENTINEL: &[u8] = b"#header end\n";

/// Header split off a file image and evaluated, before type compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHeader {
    /// `(name, descriptor)` pairs of the `"types"` map in header order.
    pub types: Vec<(String, Literal)>,
    /// Root type named by `"message"`.
    pub message_type: String,
}

/// Splits a file image into header text and payload, evaluating the header.
///
/// The returned payload is everything after the first sentinel.
///
/// # Errors
/// Returns [`FormatError`] if the sentinel is missing, the header is not
/// UTF-8 or not a well-formed literal, or the literal lacks the expected
/// shape.
pub fn read_header(mut bytes: Vec<u8>) -> Result<(RawHeader, Vec<u8>), FormatError> {
    let start = find_sentinel(&bytes).ok_or(FormatError::MissingSentinel)?;
    let payload = bytes.split_off(start + HEADER_SENTINEL.len());
    bytes.truncate(start);

    let text = std::str::from_utf8(&bytes).map_err(|e| FormatError::Utf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    let header = parse_header_text(text)?;
    tracing::debug!(
        header_len = start,
        payload_len = payload.len(),
        types = header.types.len(),
        root = %header.message_type,
        "read HDM header"
    );
    Ok((header, payload))
}

/// Evaluates header text (without the sentinel) into a [`RawHeader`].
///
/// # Errors
/// Returns [`FormatError`] if the text is not a literal dict with a
/// `"types"` dict and a `"message"` dict holding a string `"type"`.
pub fn parse_header_text(text: &str) -> Result<RawHeader, FormatError> {
    let literal = parse_literal(&strip_comments(text))?;
    if literal.as_dict().is_none() {
        return Err(FormatError::invalid_value(
            "header",
            "<root>",
            "dict",
            literal.kind(),
        ));
    }

    let types_lit = literal
        .get("types")
        .ok_or_else(|| FormatError::missing_key("header", "types"))?;
    let entries = types_lit
        .as_dict()
        .ok_or_else(|| FormatError::invalid_value("header", "types", "dict", types_lit.kind()))?;
    let mut types: Vec<(String, Literal)> = Vec::with_capacity(entries.len());
    for (key, descriptor) in entries {
        let name = key
            .as_str()
            .ok_or_else(|| FormatError::invalid_value("types", "<name>", "str", key.kind()))?;
        match types.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = descriptor.clone(),
            None => types.push((name.to_string(), descriptor.clone())),
        }
    }

    let message = literal
        .get("message")
        .ok_or_else(|| FormatError::missing_key("header", "message"))?;
    if message.as_dict().is_none() {
        return Err(FormatError::invalid_value(
            "header",
            "message",
            "dict",
            message.kind(),
        ));
    }
    let message_type = message
        .get("type")
        .ok_or_else(|| FormatError::missing_key("message", "type"))?;
    let message_type = message_type
        .as_str()
        .ok_or_else(|| FormatError::invalid_value("message", "type", "str", message_type.kind()))?
        .to_string();

    Ok(RawHeader {
        types,
        message_type,
    })
}

/// Drops every line whose first non-blank character is `#`.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_sentinel(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(HEADER_SENTINEL.len())
        .position(|w| w == HEADER_SENTINEL)
}
