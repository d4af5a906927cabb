//! Recursive-descent payload decoding.
//!
//! [`Materializer`] walks the schema from an object type, reading the
//! payload through a single [`DecodeCursor`]. Sibling references
//! (conditions and sizes) resolve against the fields already decoded in the
//! object currently being built, never against other instances.

use crate::builder::DecodeOptions;
use crate::convert::{condition_holds, enum_value, flag_value};
use hdm_core::{DecodeCursor, DecodeError, NumericArray, ParsedObject, Result, Value};
use hdm_schema::{
    FieldLayoutEntry, ObjectDef, Schema, SequenceDef, SequenceKind, SizeSpec, TypeDescriptor,
};
use std::collections::HashMap;

/// Decodes values of a schema from one payload.
#[derive(Debug)]
pub struct Materializer<'a> {
    schema: &'a Schema,
    cursor: DecodeCursor<'a>,
    options: DecodeOptions,
    depth: usize,
    /// Lower bounds on the encoded width of object and sequence types.
    widths: HashMap<&'a str, usize>,
}

impl<'a> Materializer<'a> {
    /// Creates a materializer reading `payload` from offset 0.
    #[must_use]
    pub fn new(schema: &'a Schema, payload: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            schema,
            cursor: DecodeCursor::new(payload),
            options,
            depth: 0,
            widths: HashMap::new(),
        }
    }

    /// Returns the current payload offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the number of unread payload bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Decodes the schema's root message type.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if the root is not an object type or the
    /// payload does not match the schema.
    pub fn decode_root(&mut self) -> Result<ParsedObject> {
        let schema = self.schema;
        self.decode_named_object(&schema.message_type)
    }

    /// Decodes one instance of the named object type at the cursor.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if the type is unknown or not an object, or
    /// the payload does not match the schema.
    pub fn decode_named_object(&mut self, name: &str) -> Result<ParsedObject> {
        let def = self
            .lookup(name)?
            .as_object()
            .ok_or_else(|| DecodeError::UnexpectedType {
                name: name.to_string(),
                expected: "an object type",
            })?;
        self.decode_object(def)
    }

    fn lookup(&self, name: &str) -> Result<&'a TypeDescriptor> {
        let schema = self.schema;
        schema.get_type(name).ok_or_else(|| DecodeError::UnknownType {
            name: name.to_string(),
        })
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                max_depth: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn decode_object(&mut self, def: &'a ObjectDef) -> Result<ParsedObject> {
        self.enter()?;
        let start = self.cursor.position();
        let mut obj = ParsedObject::new(def.name.clone());

        for entry in &def.layout {
            let value = if self.entry_present(def, entry, &obj)? {
                self.decode_entry(def, entry, &obj)?
            } else {
                Value::Null
            };
            assign(&mut obj, entry, value);
        }

        self.depth -= 1;
        tracing::trace!(
            object = %def.name,
            start,
            end = self.cursor.position(),
            "decoded object"
        );
        Ok(obj)
    }

    fn entry_present(
        &self,
        def: &ObjectDef,
        entry: &FieldLayoutEntry,
        scope: &ParsedObject,
    ) -> Result<bool> {
        match &entry.condition {
            None => Ok(true),
            Some(cond) => {
                let sibling = sibling(def, scope, &cond.field)?;
                condition_holds(sibling, &cond.expected)
            }
        }
    }

    fn decode_entry(
        &mut self,
        def: &ObjectDef,
        entry: &FieldLayoutEntry,
        scope: &ParsedObject,
    ) -> Result<Value> {
        let ty = self.lookup(&entry.type_name)?;
        match ty {
            TypeDescriptor::Sequence(seq) => {
                let size = entry.size.as_ref().or(seq.size.as_ref()).ok_or_else(|| {
                    DecodeError::MissingSize {
                        field: entry.primary_name().to_string(),
                    }
                })?;
                let count = resolve_size(def, scope, size, entry.primary_name())?;
                self.decode_sequence(seq, count, def, scope)
            }
            _ => match &entry.size {
                None => self.decode_single(ty, def, scope),
                Some(size) => {
                    let count = resolve_size(def, scope, size, entry.primary_name())?;
                    self.decode_elements(ty, count, SequenceKind::List, def, scope)
                }
            },
        }
    }

    /// Decodes exactly one value of `ty`.
    fn decode_single(
        &mut self,
        ty: &'a TypeDescriptor,
        def: &ObjectDef,
        scope: &ParsedObject,
    ) -> Result<Value> {
        match ty {
            TypeDescriptor::Primitive(p) => {
                let arr = self.cursor.read_array(p.format, 1)?;
                arr.get(0).ok_or_else(|| DecodeError::BufferTooShort {
                    offset: self.cursor.position(),
                    required: p.format.size(),
                    available: self.cursor.remaining(),
                })
            }
            TypeDescriptor::Enum(e) => {
                let raw = self.cursor.read_int(e.format)?;
                enum_value(e, raw)
            }
            TypeDescriptor::Flag(f) => {
                let raw = self.cursor.read_int(f.format)?;
                Ok(flag_value(f, raw))
            }
            TypeDescriptor::Sequence(seq) => {
                let size = seq
                    .size
                    .as_ref()
                    .ok_or_else(|| DecodeError::MissingSize {
                        field: seq.name.clone(),
                    })?;
                let count = resolve_size(def, scope, size, &seq.name)?;
                self.decode_sequence(seq, count, def, scope)
            }
            TypeDescriptor::Object(o) => self.decode_object(o).map(Value::Object),
        }
    }

    fn decode_sequence(
        &mut self,
        seq: &'a SequenceDef,
        count: usize,
        def: &ObjectDef,
        scope: &ParsedObject,
    ) -> Result<Value> {
        let element = self.lookup(&seq.element)?;
        self.decode_elements(element, count, seq.kind, def, scope)
    }

    /// Decodes `count` elements of `element`: one batched read for
    /// primitives, one recursive decode per element otherwise.
    fn decode_elements(
        &mut self,
        element: &'a TypeDescriptor,
        count: usize,
        kind: SequenceKind,
        def: &ObjectDef,
        scope: &ParsedObject,
    ) -> Result<Value> {
        self.enter()?;
        let values = match element {
            TypeDescriptor::Primitive(p) => {
                let arr = self.cursor.read_array(p.format, count)?;
                if kind == SequenceKind::Vector {
                    self.depth -= 1;
                    return Ok(self.finish_array(arr));
                }
                arr.into_values()
            }
            TypeDescriptor::Enum(e) => self
                .cursor
                .read_ints(e.format, count)?
                .into_iter()
                .map(|raw| enum_value(e, raw))
                .collect::<Result<Vec<_>>>()?,
            TypeDescriptor::Flag(f) => self
                .cursor
                .read_ints(f.format, count)?
                .into_iter()
                .map(|raw| flag_value(f, raw))
                .collect(),
            TypeDescriptor::Sequence(_) | TypeDescriptor::Object(_) => {
                self.check_count(element, count)?;
                let mut values = Vec::new();
                for _ in 0..count {
                    values.push(self.decode_single(element, def, scope)?);
                }
                values
            }
        };
        self.depth -= 1;
        Ok(self.finish_list(values))
    }

    /// Rejects an element count the remaining payload cannot hold. Elements
    /// that may occupy no bytes are capped by `max_elements` instead.
    fn check_count(&mut self, element: &'a TypeDescriptor, count: usize) -> Result<()> {
        let width = self.width_of(element, &mut Vec::new());
        if width == 0 {
            if count > self.options.max_elements {
                return Err(DecodeError::TooManyElements {
                    type_name: element.name().to_string(),
                    count,
                    max_elements: self.options.max_elements,
                });
            }
            return Ok(());
        }
        let required = count.saturating_mul(width);
        if required > self.cursor.remaining() {
            return Err(DecodeError::BufferTooShort {
                offset: self.cursor.position(),
                required,
                available: self.cursor.remaining(),
            });
        }
        Ok(())
    }

    /// Minimum number of payload bytes one value of `ty` occupies.
    /// Conditional entries and sibling-sized sequences count as zero, as
    /// does any type already being measured further up.
    fn width_of(&mut self, ty: &'a TypeDescriptor, in_progress: &mut Vec<&'a str>) -> usize {
        let name = match ty {
            TypeDescriptor::Primitive(p) => return p.format.size(),
            TypeDescriptor::Enum(e) => return e.format.size(),
            TypeDescriptor::Flag(f) => return f.format.size(),
            TypeDescriptor::Sequence(seq) => seq.name.as_str(),
            TypeDescriptor::Object(o) => o.name.as_str(),
        };
        if let Some(width) = self.widths.get(name) {
            return *width;
        }
        if in_progress.contains(&name) {
            return 0;
        }

        in_progress.push(name);
        let width = match ty {
            TypeDescriptor::Sequence(seq) => {
                self.sequence_width(seq, seq.size.as_ref(), in_progress)
            }
            TypeDescriptor::Object(o) => o
                .layout
                .iter()
                .filter(|entry| entry.condition.is_none())
                .fold(0usize, |total, entry| {
                    total.saturating_add(self.entry_width(entry, in_progress))
                }),
            _ => 0,
        };
        in_progress.pop();
        self.widths.insert(name, width);
        width
    }

    fn entry_width(
        &mut self,
        entry: &'a FieldLayoutEntry,
        in_progress: &mut Vec<&'a str>,
    ) -> usize {
        let schema = self.schema;
        let Some(ty) = schema.get_type(&entry.type_name) else {
            return 0;
        };
        match (ty, &entry.size) {
            (TypeDescriptor::Sequence(seq), size) => {
                self.sequence_width(seq, size.as_ref().or(seq.size.as_ref()), in_progress)
            }
            (_, None) => self.width_of(ty, in_progress),
            (_, Some(SizeSpec::Fixed(n))) => n.saturating_mul(self.width_of(ty, in_progress)),
            (_, Some(SizeSpec::Field(_))) => 0,
        }
    }

    fn sequence_width(
        &mut self,
        seq: &'a SequenceDef,
        size: Option<&'a SizeSpec>,
        in_progress: &mut Vec<&'a str>,
    ) -> usize {
        let schema = self.schema;
        match (size, schema.get_type(&seq.element)) {
            (Some(SizeSpec::Fixed(n)), Some(element)) => {
                n.saturating_mul(self.width_of(element, in_progress))
            }
            _ => 0,
        }
    }

    fn finish_list(&self, mut values: Vec<Value>) -> Value {
        if self.options.collapse_singletons && values.len() == 1 {
            if let Some(only) = values.pop() {
                return only;
            }
        }
        Value::List(values)
    }

    fn finish_array(&self, arr: NumericArray) -> Value {
        if self.options.collapse_singletons && arr.len() == 1 {
            if let Some(only) = arr.get(0) {
                return only;
            }
        }
        Value::Array(arr)
    }
}

/// Assigns one decoded value to every name the entry declares.
fn assign(obj: &mut ParsedObject, entry: &FieldLayoutEntry, value: Value) {
    if let Some((last, rest)) = entry.field_names.split_last() {
        for name in rest {
            obj.insert(name.as_str(), value.clone());
        }
        obj.insert(last.as_str(), value);
    }
}

/// Looks up a sibling decoded earlier in the same instance. A sibling that
/// was skipped by its own condition counts as unresolved.
fn sibling<'o>(def: &ObjectDef, scope: &'o ParsedObject, field: &str) -> Result<&'o Value> {
    scope
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| DecodeError::UnresolvedField {
            field: field.to_string(),
            object: def.name.clone(),
        })
}

fn resolve_size(
    def: &ObjectDef,
    scope: &ParsedObject,
    size: &SizeSpec,
    field: &str,
) -> Result<usize> {
    match size {
        SizeSpec::Fixed(n) => Ok(*n),
        SizeSpec::Field(name) => {
            let value = sibling(def, scope, name)?;
            value
                .as_int()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| DecodeError::InvalidSize {
                    field: field.to_string(),
                    value: value.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdm_core::Complex;
    use hdm_schema::{build_schema, parse_header_text};

    fn schema(types: &str, message: &str) -> Schema {
        let text = format!("{{'types': {{{types}}}, 'message': {{'type': '{message}'}}}}");
        build_schema(&parse_header_text(&text).unwrap()).unwrap()
    }

    fn decode(schema: &Schema, payload: &[u8]) -> (Result<ParsedObject>, usize) {
        let mut m = Materializer::new(schema, payload, DecodeOptions::default());
        let result = m.decode_root();
        (result, m.position())
    }

    const U8: &str = "'u8': {'type': 'int', 'size': 1, 'signed': False}";

    #[test]
    fn test_point() {
        let s = schema(
            &format!(
                "{U8}, 'Point': {{'type': 'object', 'layout': [
                    {{'type': 'u8', 'field_names': ['x']}},
                    {{'type': 'u8', 'field_names': ['y']}}]}}"
            ),
            "Point",
        );
        let (obj, pos) = decode(&s, &[3, 4]);
        let obj = obj.unwrap();
        assert_eq!(obj.get("x"), Some(&Value::Int(3)));
        assert_eq!(obj.get("y"), Some(&Value::Int(4)));
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_multiple_field_names_share_one_read() {
        let s = schema(
            &format!(
                "{U8}, 'T': {{'type': 'object', 'layout': [
                    {{'type': 'u8', 'field_names': ['a', 'b']}}]}}"
            ),
            "T",
        );
        let (obj, pos) = decode(&s, &[9]);
        let obj = obj.unwrap();
        assert_eq!(obj.get("a"), Some(&Value::Int(9)));
        assert_eq!(obj.get("b"), Some(&Value::Int(9)));
        assert_eq!(pos, 1);
    }

    #[test]
    fn test_false_condition_consumes_nothing() {
        let types = format!(
            "{U8}, 'Kind': {{'type': 'enum', 'size': 1, 'values': ['PLAIN', 'EXTENDED']}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'Kind', 'field_names': ['kind']}},
                {{'type': 'u8', 'field_names': ['extra'], 'condition': ('kind', 'EXTENDED')}},
                {{'type': 'u8', 'field_names': ['tail']}}]}}"
        );
        let s = schema(&types, "T");

        let (obj, pos) = decode(&s, &[0, 7]);
        let obj = obj.unwrap();
        assert!(obj.get("extra").is_some_and(Value::is_null));
        assert_eq!(obj.get("tail"), Some(&Value::Int(7)));
        assert_eq!(pos, 2);

        let (obj, pos) = decode(&s, &[1, 5, 7]);
        let obj = obj.unwrap();
        assert_eq!(obj.get("extra"), Some(&Value::Int(5)));
        assert_eq!(obj.get("tail"), Some(&Value::Int(7)));
        assert_eq!(pos, 3);
    }

    #[test]
    fn test_flag_condition() {
        let types = format!(
            "{U8}, 'Opts': {{'type': 'flag', 'size': 1, 'values': ['A', 'B', 'C']}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'Opts', 'field_names': ['opts']}},
                {{'type': 'u8', 'field_names': ['a'], 'condition': ('opts', 'A')}},
                {{'type': 'u8', 'field_names': ['b'], 'condition': ('opts', 'B')}},
                {{'type': 'u8', 'field_names': ['c'], 'condition': ('opts', 'C')}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, pos) = decode(&s, &[0b101, 10, 30]);
        let obj = obj.unwrap();
        let flags = obj.get("opts").and_then(Value::as_flags).unwrap();
        assert_eq!(flags.set_names(), vec!["A", "C"]);
        assert_eq!(obj.get("a"), Some(&Value::Int(10)));
        assert!(obj.get("b").is_some_and(Value::is_null));
        assert_eq!(obj.get("c"), Some(&Value::Int(30)));
        assert_eq!(pos, 3);
    }

    #[test]
    fn test_sibling_sized_vector() {
        let types = format!(
            "{U8}, 'f32': {{'type': 'float', 'size': 4}},
             'Samples': {{'type': 'vector', 'base': 'f32'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['n']}},
                {{'type': 'Samples', 'field_names': ['data'], 'size': 'n'}}]}}"
        );
        let s = schema(&types, "T");
        let mut payload = vec![3u8];
        for x in [1.0f32, 2.0, 3.0] {
            payload.extend_from_slice(&x.to_le_bytes());
        }
        let (obj, pos) = decode(&s, &payload);
        assert_eq!(
            obj.unwrap().get("data"),
            Some(&Value::Array(NumericArray::Float(vec![1.0, 2.0, 3.0])))
        );
        assert_eq!(pos, 13);
    }

    #[test]
    fn test_type_level_size_and_list_of_objects() {
        let types = format!(
            "{U8}, 'P': {{'type': 'object', 'layout': [{{'type': 'u8', 'field_names': ['v']}}]}},
             'Ps': {{'type': 'list', 'base': 'P', 'size': 2}},
             'T': {{'type': 'object', 'layout': [{{'type': 'Ps', 'field_names': ['ps']}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, pos) = decode(&s, &[4, 5]);
        let obj = obj.unwrap();
        let ps = obj.get("ps").and_then(Value::as_list).unwrap();
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[1].get("v"), Some(&Value::Int(5)));
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_singleton_list_collapses() {
        let types = format!(
            "{U8}, 'L': {{'type': 'list', 'base': 'u8', 'size': 1}},
             'T': {{'type': 'object', 'layout': [{{'type': 'L', 'field_names': ['l']}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, _) = decode(&s, &[42]);
        assert_eq!(obj.unwrap().get("l"), Some(&Value::Int(42)));

        let options = DecodeOptions {
            collapse_singletons: false,
            ..DecodeOptions::default()
        };
        let mut m = Materializer::new(&s, &[42], options);
        assert_eq!(
            m.decode_root().unwrap().get("l"),
            Some(&Value::List(vec![Value::Int(42)]))
        );
    }

    #[test]
    fn test_empty_sequence() {
        let types = format!(
            "{U8}, 'V': {{'type': 'vector', 'base': 'u8'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['n']}},
                {{'type': 'V', 'field_names': ['v'], 'size': 'n'}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, pos) = decode(&s, &[0]);
        assert_eq!(
            obj.unwrap().get("v"),
            Some(&Value::Array(NumericArray::Int(Vec::new())))
        );
        assert_eq!(pos, 1);
    }

    #[test]
    fn test_sized_entry_on_plain_type() {
        let types = format!(
            "{U8}, 'c64': {{'type': 'complex', 'size': 4}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'c64', 'field_names': ['z'], 'size': 2}},
                {{'type': 'u8', 'field_names': ['end']}}]}}"
        );
        let s = schema(&types, "T");
        let mut payload = Vec::new();
        for x in [1.0f32, -1.0, 0.5, 2.0] {
            payload.extend_from_slice(&x.to_le_bytes());
        }
        payload.push(8);
        let (obj, pos) = decode(&s, &payload);
        let obj = obj.unwrap();
        assert_eq!(
            obj.get("z"),
            Some(&Value::List(vec![
                Value::Complex(Complex::new(1.0, -1.0)),
                Value::Complex(Complex::new(0.5, 2.0)),
            ]))
        );
        assert_eq!(obj.get("end"), Some(&Value::Int(8)));
        assert_eq!(pos, 17);
    }

    #[test]
    fn test_list_of_enums() {
        let types = "'Kind': {'type': 'enum', 'size': 2, 'values': ['A', 'B', 'C'], 'start': 1},
             'Ks': {'type': 'list', 'base': 'Kind', 'size': 2},
             'T': {'type': 'object', 'layout': [{'type': 'Ks', 'field_names': ['ks']}]}";
        let s = schema(types, "T");
        let (obj, pos) = decode(&s, &[3, 0, 1, 0]);
        let obj = obj.unwrap();
        let names: Vec<&str> = obj
            .get("ks")
            .and_then(Value::as_list)
            .unwrap()
            .iter()
            .filter_map(|v| v.as_enum().map(|m| m.name.as_str()))
            .collect();
        assert_eq!(names, vec!["C", "A"]);
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_unresolved_and_skipped_siblings() {
        let types = format!(
            "{U8}, 'V': {{'type': 'vector', 'base': 'u8'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['flag']}},
                {{'type': 'u8', 'field_names': ['n'], 'condition': ('flag', 1)}},
                {{'type': 'V', 'field_names': ['v'], 'size': 'n'}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, pos) = decode(&s, &[0, 0]);
        assert_eq!(
            obj,
            Err(DecodeError::UnresolvedField {
                field: "n".to_string(),
                object: "T".to_string(),
            })
        );
        assert_eq!(pos, 1);

        let forward = format!(
            "{U8}, 'V': {{'type': 'vector', 'base': 'u8'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'V', 'field_names': ['v'], 'size': 'n'}},
                {{'type': 'u8', 'field_names': ['n']}}]}}"
        );
        let s = schema(&forward, "T");
        assert!(matches!(
            decode(&s, &[1, 1]).0,
            Err(DecodeError::UnresolvedField { .. })
        ));
    }

    #[test]
    fn test_truncated_payload_reports_position() {
        let types = format!(
            "{U8}, 'i32': {{'type': 'int', 'size': 4}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['a']}},
                {{'type': 'i32', 'field_names': ['b']}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, pos) = decode(&s, &[1, 2, 3]);
        assert_eq!(
            obj,
            Err(DecodeError::BufferTooShort {
                offset: 1,
                required: 4,
                available: 2,
            })
        );
        assert_eq!(pos, 1);
    }

    #[test]
    fn test_unknown_types() {
        let s = schema(
            "'T': {'type': 'object', 'layout': [{'type': 'nope', 'field_names': ['x']}]}",
            "T",
        );
        assert_eq!(
            decode(&s, &[]).0,
            Err(DecodeError::UnknownType {
                name: "nope".to_string(),
            })
        );

        let s = schema(&format!("{U8}"), "u8");
        assert!(matches!(
            decode(&s, &[1]).0,
            Err(DecodeError::UnexpectedType { .. })
        ));

        let s = schema(&format!("{U8}"), "Missing");
        assert!(matches!(
            decode(&s, &[1]).0,
            Err(DecodeError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_missing_sequence_size() {
        let types = format!(
            "{U8}, 'V': {{'type': 'vector', 'base': 'u8'}},
             'T': {{'type': 'object', 'layout': [{{'type': 'V', 'field_names': ['v']}}]}}"
        );
        let s = schema(&types, "T");
        assert_eq!(
            decode(&s, &[1]).0,
            Err(DecodeError::MissingSize {
                field: "v".to_string(),
            })
        );
    }

    #[test]
    fn test_depth_limit() {
        let types = "'T': {'type': 'object', 'layout': [{'type': 'T', 'field_names': ['inner']}]}";
        let s = schema(types, "T");
        let options = DecodeOptions {
            max_depth: 8,
            ..DecodeOptions::default()
        };
        let mut m = Materializer::new(&s, &[], options);
        assert_eq!(
            m.decode_root(),
            Err(DecodeError::DepthExceeded { max_depth: 8 })
        );
    }

    #[test]
    fn test_self_referential_list_hits_depth_limit() {
        let types = "'L': {'type': 'list', 'base': 'L', 'size': 2},
             'T': {'type': 'object', 'layout': [{'type': 'L', 'field_names': ['l']}]}";
        let s = schema(types, "T");
        assert!(matches!(
            decode(&s, &[]).0,
            Err(DecodeError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_negative_size_rejected() {
        let types = "'i8': {'type': 'int', 'size': 1},
             'V': {'type': 'vector', 'base': 'i8'},
             'T': {'type': 'object', 'layout': [
                {'type': 'i8', 'field_names': ['n']},
                {'type': 'V', 'field_names': ['v'], 'size': 'n'}]}";
        let s = schema(types, "T");
        assert_eq!(
            decode(&s, &[0xFF]).0,
            Err(DecodeError::InvalidSize {
                field: "v".to_string(),
                value: "-1".to_string(),
            })
        );
    }

    const EMPTY_LIST: &str = "'u32': {'type': 'int', 'size': 4, 'signed': False},
         'E': {'type': 'object', 'layout': []},
         'Es': {'type': 'list', 'base': 'E'},
         'T': {'type': 'object', 'layout': [
            {'type': 'u32', 'field_names': ['n']},
            {'type': 'Es', 'field_names': ['es'], 'size': 'n'}]}";

    #[test]
    fn test_zero_width_elements_are_capped() {
        let s = schema(EMPTY_LIST, "T");
        let (obj, pos) = decode(&s, &5_000_000u32.to_le_bytes());
        assert_eq!(
            obj,
            Err(DecodeError::TooManyElements {
                type_name: "E".to_string(),
                count: 5_000_000,
                max_elements: DecodeOptions::default().max_elements,
            })
        );
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_zero_width_elements_within_limit() {
        let s = schema(EMPTY_LIST, "T");
        let options = DecodeOptions {
            max_elements: 3,
            ..DecodeOptions::default()
        };
        let payload = 3u32.to_le_bytes();
        let mut m = Materializer::new(&s, &payload, options);
        let obj = m.decode_root().unwrap();
        let es = obj.get("es").and_then(Value::as_list).map(<[Value]>::len);
        assert_eq!(es, Some(3));

        let payload = 4u32.to_le_bytes();
        let mut m = Materializer::new(&s, &payload, options);
        assert!(matches!(
            m.decode_root(),
            Err(DecodeError::TooManyElements { count: 4, max_elements: 3, .. })
        ));
    }

    #[test]
    fn test_conditional_only_elements_count_as_zero_width() {
        let types = format!(
            "{U8}, 'u32': {{'type': 'int', 'size': 4, 'signed': False}},
             'Opt': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['v'], 'condition': ('v', 1)}}]}},
             'Opts': {{'type': 'list', 'base': 'Opt'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u32', 'field_names': ['n']}},
                {{'type': 'Opts', 'field_names': ['opts'], 'size': 'n'}}]}}"
        );
        let s = schema(&types, "T");
        assert!(matches!(
            decode(&s, &u32::MAX.to_le_bytes()).0,
            Err(DecodeError::TooManyElements { .. })
        ));
    }

    #[test]
    fn test_element_count_checked_against_payload() {
        let types = format!(
            "{U8}, 'u32': {{'type': 'int', 'size': 4, 'signed': False}},
             'f64': {{'type': 'float', 'size': 8}},
             'Pair': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['tag']}},
                {{'type': 'f64', 'field_names': ['value']}}]}},
             'Pairs': {{'type': 'list', 'base': 'Pair'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u32', 'field_names': ['n']}},
                {{'type': 'Pairs', 'field_names': ['pairs'], 'size': 'n'}}]}}"
        );
        let s = schema(&types, "T");
        let mut payload = 1000u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0; 18]);
        let (obj, pos) = decode(&s, &payload);
        assert_eq!(
            obj,
            Err(DecodeError::BufferTooShort {
                offset: 4,
                required: 9000,
                available: 18,
            })
        );
        assert_eq!(pos, 4);

        let mut payload = 2u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0; 18]);
        let (obj, pos) = decode(&s, &payload);
        let pairs = obj.unwrap().get("pairs").and_then(Value::as_list).map(<[Value]>::len);
        assert_eq!(pairs, Some(2));
        assert_eq!(pos, 22);
    }

    #[test]
    fn test_nested_fixed_widths_add_up() {
        let types = format!(
            "{U8}, 'Row': {{'type': 'vector', 'base': 'u8', 'size': 3}},
             'Grid': {{'type': 'object', 'layout': [
                {{'type': 'Row', 'field_names': ['rows'], 'size': 2}},
                {{'type': 'u8', 'field_names': ['pad'], 'size': 2}}]}},
             'Grids': {{'type': 'list', 'base': 'Grid'}},
             'T': {{'type': 'object', 'layout': [
                {{'type': 'u8', 'field_names': ['n']}},
                {{'type': 'Grids', 'field_names': ['g'], 'size': 'n'}}]}}"
        );
        let s = schema(&types, "T");
        let (obj, _) = decode(&s, &[3, 0, 0, 0, 0]);
        assert_eq!(
            obj,
            Err(DecodeError::BufferTooShort {
                offset: 1,
                required: 3 * 4,
                available: 4,
            })
        );
    }
}
