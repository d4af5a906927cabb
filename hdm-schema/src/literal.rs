//! Header literal evaluation.
//!
//! The header of an HDM file is a single literal expression in a
//! Python-like syntax: dicts, lists, tuples, quoted strings, integers,
//! floats, `True`, `False` and `None`. Nothing is executed; the text is
//! parsed into a [`Literal`] tree.

use crate::error::FormatError;

/// Containers nested deeper than this are rejected.
const MAX_NESTING: usize = 256;

/// A parsed header literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `None`.
    None,
    /// `True` or `False`.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Quoted string.
    Str(String),
    /// `[...]`.
    List(Vec<Literal>),
    /// `(...)`.
    Tuple(Vec<Literal>),
    /// `{key: value, ...}` in source order.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Returns a short name of the literal kind for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the items of a list or tuple.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Literal]> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of a dict.
    #[must_use]
    pub fn as_dict(&self) -> Option<&[(Literal, Literal)]> {
        match self {
            Self::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a string key in a dict. A key repeated in the source
    /// resolves to its last value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.as_dict()?
            .iter()
            .rev()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }
}

/// Parses a complete literal expression.
///
/// # Errors
/// Returns [`FormatError::Literal`] with the byte offset of the first
/// problem if `src` is not exactly one well-formed literal.
pub fn parse_literal(src: &str) -> Result<Literal, FormatError> {
    let mut parser = LiteralParser { src, pos: 0 };
    let value = parser.parse_value(0)?;
    parser.skip_trivia();
    if parser.pos != src.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl LiteralParser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError::literal(self.pos, message)
    }

    /// Skips whitespace, `#` comments and backslash line continuations.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('\\') if self.peek_second() == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        self.skip_trivia();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Literal, FormatError> {
        if depth > MAX_NESTING {
            return Err(self.error("literal nested too deeply"));
        }
        self.skip_trivia();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.parse_dict(depth),
            Some('[') => {
                self.bump();
                self.parse_items(']', depth).map(Literal::List)
            }
            Some('(') => self.parse_tuple(depth),
            Some('\'' | '"') => self.parse_strings(),
            Some(sign @ ('-' | '+')) => {
                self.bump();
                let start = self.pos;
                match self.parse_value(depth + 1)? {
                    Literal::Int(v) if sign == '-' => v
                        .checked_neg()
                        .map(Literal::Int)
                        .ok_or_else(|| FormatError::literal(start, "integer out of range")),
                    Literal::Float(v) if sign == '-' => Ok(Literal::Float(-v)),
                    v @ (Literal::Int(_) | Literal::Float(_)) => Ok(v),
                    other => Err(FormatError::literal(
                        start,
                        format!("bad operand for unary {sign}: {}", other.kind()),
                    )),
                }
            }
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('.') if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Literal, FormatError> {
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            let key_pos = self.pos;
            let key = self.parse_value(depth + 1)?;
            if matches!(key, Literal::List(_) | Literal::Dict(_)) {
                return Err(FormatError::literal(
                    key_pos,
                    format!("unhashable dict key of kind {}", key.kind()),
                ));
            }
            self.expect(':')?;
            let value = self.parse_value(depth + 1)?;
            entries.push((key, value));
            self.skip_trivia();
            match self.bump() {
                Some(',') => {}
                Some('}') => break,
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.error(format!("expected ',' or '}}', found '{c}'")));
                }
                None => return Err(self.error("unterminated dict")),
            }
        }
        Ok(Literal::Dict(entries))
    }

    /// Parses comma-separated items up to `close`; the opener is consumed.
    fn parse_items(&mut self, close: char, depth: usize) -> Result<Vec<Literal>, FormatError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                break;
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_trivia();
            match self.bump() {
                Some(',') => {}
                Some(c) if c == close => break,
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.error(format!("expected ',' or '{close}', found '{c}'")));
                }
                None => return Err(self.error(format!("missing closing '{close}'"))),
            }
        }
        Ok(items)
    }

    fn parse_tuple(&mut self, depth: usize) -> Result<Literal, FormatError> {
        self.bump();
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Literal::Tuple(Vec::new()));
        }
        let first = self.parse_value(depth + 1)?;
        self.skip_trivia();
        match self.bump() {
            // A parenthesised expression, not a tuple.
            Some(')') => Ok(first),
            Some(',') => {
                let mut items = vec![first];
                items.extend(self.parse_items(')', depth)?);
                Ok(Literal::Tuple(items))
            }
            Some(c) => {
                self.pos -= c.len_utf8();
                Err(self.error(format!("expected ',' or ')', found '{c}'")))
            }
            None => Err(self.error("missing closing ')'")),
        }
    }

    /// Parses one string literal plus any adjacent ones, concatenated.
    fn parse_strings(&mut self) -> Result<Literal, FormatError> {
        let mut out = self.parse_string()?;
        loop {
            self.skip_trivia();
            if !matches!(self.peek(), Some('\'' | '"')) {
                break;
            }
            out.push_str(&self.parse_string()?);
        }
        Ok(Literal::Str(out))
    }

    fn parse_string(&mut self) -> Result<String, FormatError> {
        let start = self.pos;
        let quote = self.bump().unwrap_or('"');
        let triple: String = std::iter::repeat_n(quote, 3).collect();
        let is_triple = self.src[start..].starts_with(&triple);
        if is_triple {
            self.pos = start + triple.len();
        }

        let mut out = String::new();
        loop {
            if is_triple {
                if self.rest().starts_with(&triple) {
                    self.pos += triple.len();
                    break;
                }
            } else if self.peek() == Some(quote) {
                self.bump();
                break;
            }
            match self.bump() {
                None => return Err(FormatError::literal(start, "unterminated string")),
                Some('\n') if !is_triple => {
                    return Err(FormatError::literal(start, "unterminated string"));
                }
                Some('\\') => self.parse_escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), FormatError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape sequence"));
        };
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\\' | '\'' | '"' => out.push(c),
            '\n' => {}
            'x' => out.push(self.parse_hex_escape(2)?),
            'u' => out.push(self.parse_hex_escape(4)?),
            'U' => out.push(self.parse_hex_escape(8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char, FormatError> {
        let start = self.pos;
        let hex: String = self.rest().chars().take(digits).collect();
        if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FormatError::literal(start, "truncated hex escape"));
        }
        self.pos += digits;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| FormatError::literal(start, format!("invalid code point \\{hex}")))
    }

    fn parse_number(&mut self) -> Result<Literal, FormatError> {
        let start = self.pos;
        let radix = match self.rest().get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("0x") => Some(16),
            Some("0o") => Some(8),
            Some("0b") => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
            let digits = self.src[digits_start..self.pos].replace('_', "");
            return i64::from_str_radix(&digits, radix)
                .map(Literal::Int)
                .map_err(|_| FormatError::literal(start, "invalid integer literal"));
        }

        let mut is_float = false;
        self.consume_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            self.consume_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            let exp_start = self.pos;
            self.consume_while(|c| c.is_ascii_digit());
            if self.pos == exp_start {
                return Err(self.error("missing exponent digits"));
            }
        }
        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return Err(self.error("invalid numeric literal"));
        }

        let text = self.src[start..self.pos].replace('_', "");
        if is_float {
            text.parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| FormatError::literal(start, "invalid float literal"))
        } else {
            text.parse::<i64>()
                .map(Literal::Int)
                .map_err(|_| FormatError::literal(start, "integer out of range"))
        }
    }

    fn parse_name(&mut self) -> Result<Literal, FormatError> {
        let start = self.pos;
        self.consume_while(|c| c.is_alphanumeric() || c == '_');
        match &self.src[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            name => Err(FormatError::literal(
                start,
                format!("'{name}' is not a literal"),
            )),
        }
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }
}
