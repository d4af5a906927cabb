//! Type system compilation.
//!
//! Turns the evaluated header into a [`Schema`]. Every descriptor is
//! compiled exactly once, before any payload byte is read. Type references
//! (list elements, layout entry types, the root message) are kept by name
//! and resolved at decode time.

use crate::error::FormatError;
use crate::header::RawHeader;
use crate::layout::{Condition, Expected, FieldLayoutEntry, ObjectDef, SizeSpec};
use crate::literal::Literal;
use crate::types::{
    EnumDef, EnumValue, FlagBit, FlagDef, PrimitiveDef, Schema, SequenceDef, SequenceKind,
    TypeDescriptor,
};
use hdm_core::ScalarFormat;

/// Compiles every descriptor of a raw header into a schema.
///
/// # Errors
/// Returns [`FormatError`] on an unknown `type` tag, an unsupported byte
/// width, or a missing or mistyped descriptor key.
pub fn build_schema(header: &RawHeader) -> Result<Schema, FormatError> {
    let mut schema = Schema::new(header.message_type.clone());
    for (name, descriptor) in &header.types {
        schema.add_type(compile_type(name, descriptor)?);
    }
    if !schema.has_type(&schema.message_type) {
        tracing::warn!(root = %schema.message_type, "root message type is not defined");
    }
    tracing::debug!(types = schema.len(), "compiled HDM schema");
    Ok(schema)
}

/// Compiles one named descriptor.
///
/// # Errors
/// See [`build_schema`].
pub fn compile_type(name: &str, descriptor: &Literal) -> Result<TypeDescriptor, FormatError> {
    let ctx = format!("type '{name}'");
    if descriptor.as_dict().is_none() {
        return Err(FormatError::invalid_value(
            &ctx,
            "<descriptor>",
            "dict",
            descriptor.kind(),
        ));
    }
    let tag = required_str(descriptor, "type", &ctx)?;

    let compiled = match tag {
        "int" => TypeDescriptor::Primitive(PrimitiveDef::new(
            name.to_string(),
            int_format(name, descriptor, &ctx)?,
        )),
        "float" => {
            let width = required_int(descriptor, "size", &ctx)?;
            let format = usize::try_from(width)
                .ok()
                .and_then(ScalarFormat::float)
                .ok_or_else(|| unsupported_width(name, "float", width))?;
            TypeDescriptor::Primitive(PrimitiveDef::new(name.to_string(), format))
        }
        "complex" => {
            let width = required_int(descriptor, "size", &ctx)?;
            let format = usize::try_from(width)
                .ok()
                .and_then(ScalarFormat::complex)
                .ok_or_else(|| unsupported_width(name, "complex", width))?;
            TypeDescriptor::Primitive(PrimitiveDef::new(name.to_string(), format))
        }
        "enum" => TypeDescriptor::Enum(compile_enum(name, descriptor, &ctx)?),
        "flag" => TypeDescriptor::Flag(compile_flag(name, descriptor, &ctx)?),
        "list" | "vector" => {
            let kind = if tag == "list" {
                SequenceKind::List
            } else {
                SequenceKind::Vector
            };
            let element = required_str(descriptor, "base", &ctx)?.to_string();
            let size = optional_size(descriptor, &ctx)?;
            TypeDescriptor::Sequence(SequenceDef::new(name.to_string(), kind, element, size))
        }
        "object" => TypeDescriptor::Object(compile_object(name, descriptor, &ctx)?),
        other => {
            return Err(FormatError::UnknownTypeTag {
                type_name: name.to_string(),
                tag: other.to_string(),
            });
        }
    };
    tracing::trace!(name, tag, "compiled type");
    Ok(compiled)
}

fn int_format(name: &str, descriptor: &Literal, ctx: &str) -> Result<ScalarFormat, FormatError> {
    let width = required_int(descriptor, "size", ctx)?;
    let signed = match descriptor.get("signed") {
        None => true,
        Some(lit) => lit
            .as_bool()
            .ok_or_else(|| FormatError::invalid_value(ctx, "signed", "bool", lit.kind()))?,
    };
    usize::try_from(width)
        .ok()
        .and_then(|w| ScalarFormat::int(w, signed))
        .ok_or_else(|| unsupported_width(name, "int", width))
}

fn compile_enum(name: &str, descriptor: &Literal, ctx: &str) -> Result<EnumDef, FormatError> {
    let mut def = EnumDef::new(name.to_string(), int_format(name, descriptor, ctx)?);
    let start = match descriptor.get("start") {
        None => 0,
        Some(lit) => lit
            .as_int()
            .ok_or_else(|| FormatError::invalid_value(ctx, "start", "int", lit.kind()))?,
    };
    for (member, ordinal) in named_values(descriptor, ctx)? {
        let ordinal = match ordinal {
            Some(explicit) => explicit,
            None => start.saturating_add(i64::try_from(def.members.len()).unwrap_or(i64::MAX)),
        };
        def.add_member(EnumValue::new(member, ordinal));
    }
    Ok(def)
}

fn compile_flag(name: &str, descriptor: &Literal, ctx: &str) -> Result<FlagDef, FormatError> {
    let format = int_format(name, descriptor, ctx)?;
    let mut def = FlagDef::new(name.to_string(), format);
    for (index, (flag, bit)) in named_values(descriptor, ctx)?.into_iter().enumerate() {
        let bit = bit.unwrap_or(index as i64);
        let bit = u32::try_from(bit)
            .ok()
            .filter(|&b| b < format.bits())
            .ok_or_else(|| {
                FormatError::invalid_value(
                    ctx,
                    "values",
                    format!("bit position below {}", format.bits()),
                    bit.to_string(),
                )
            })?;
        def.add_bit(FlagBit::new(flag, bit));
    }
    Ok(def)
}

/// Reads `"values"` as either a list of names or a dict of name to int.
fn named_values(descriptor: &Literal, ctx: &str) -> Result<Vec<(String, Option<i64>)>, FormatError> {
    let values = descriptor
        .get("values")
        .ok_or_else(|| FormatError::missing_key(ctx, "values"))?;
    if let Some(items) = values.as_seq() {
        return items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| (s.to_string(), None))
                    .ok_or_else(|| FormatError::invalid_value(ctx, "values", "str", item.kind()))
            })
            .collect();
    }
    if let Some(entries) = values.as_dict() {
        return entries
            .iter()
            .map(|(k, v)| {
                let key = k
                    .as_str()
                    .ok_or_else(|| FormatError::invalid_value(ctx, "values", "str", k.kind()))?;
                let value = v
                    .as_int()
                    .ok_or_else(|| FormatError::invalid_value(ctx, "values", "int", v.kind()))?;
                Ok((key.to_string(), Some(value)))
            })
            .collect();
    }
    Err(FormatError::invalid_value(
        ctx,
        "values",
        "list or dict",
        values.kind(),
    ))
}

fn compile_object(name: &str, descriptor: &Literal, ctx: &str) -> Result<ObjectDef, FormatError> {
    let layout = descriptor
        .get("layout")
        .ok_or_else(|| FormatError::missing_key(ctx, "layout"))?;
    let entries = layout
        .as_seq()
        .ok_or_else(|| FormatError::invalid_value(ctx, "layout", "list", layout.kind()))?;

    let mut def = ObjectDef::new(name.to_string());
    for (index, entry) in entries.iter().enumerate() {
        let entry_ctx = format!("layout entry {index} of {ctx}");
        def.add_entry(compile_entry(entry, &entry_ctx)?);
    }
    Ok(def)
}

fn compile_entry(entry: &Literal, ctx: &str) -> Result<FieldLayoutEntry, FormatError> {
    if entry.as_dict().is_none() {
        return Err(FormatError::invalid_value(ctx, "<entry>", "dict", entry.kind()));
    }
    let type_name = required_str(entry, "type", ctx)?.to_string();

    let names_lit = entry
        .get("field_names")
        .ok_or_else(|| FormatError::missing_key(ctx, "field_names"))?;
    let field_names: Vec<String> = match names_lit {
        Literal::Str(single) => vec![single.clone()],
        other => other
            .as_seq()
            .ok_or_else(|| {
                FormatError::invalid_value(ctx, "field_names", "list of str", other.kind())
            })?
            .iter()
            .map(|n| {
                n.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| FormatError::invalid_value(ctx, "field_names", "str", n.kind()))
            })
            .collect::<Result<_, _>>()?,
    };
    if field_names.is_empty() {
        return Err(FormatError::invalid_value(
            ctx,
            "field_names",
            "at least one name",
            "empty list",
        ));
    }

    let mut compiled = FieldLayoutEntry::new(type_name, field_names);
    compiled.condition = match entry.get("condition") {
        None | Some(Literal::None) => None,
        Some(lit) => Some(compile_condition(lit, ctx)?),
    };
    compiled.size = optional_size(entry, ctx)?;
    Ok(compiled)
}

fn compile_condition(lit: &Literal, ctx: &str) -> Result<Condition, FormatError> {
    let pair = lit
        .as_seq()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| FormatError::invalid_value(ctx, "condition", "(field, value) pair", lit.kind()))?;
    let field = pair[0]
        .as_str()
        .ok_or_else(|| FormatError::invalid_value(ctx, "condition", "str field name", pair[0].kind()))?
        .to_string();
    let expected = match &pair[1] {
        Literal::Str(s) => Expected::Name(s.clone()),
        Literal::Int(v) => Expected::Int(*v),
        Literal::Bool(b) => Expected::Bool(*b),
        other => {
            return Err(FormatError::invalid_value(
                ctx,
                "condition",
                "str, int or bool value",
                other.kind(),
            ));
        }
    };
    Ok(Condition { field, expected })
}

fn optional_size(descriptor: &Literal, ctx: &str) -> Result<Option<SizeSpec>, FormatError> {
    match descriptor.get("size") {
        None | Some(Literal::None) => Ok(None),
        Some(Literal::Int(n)) => usize::try_from(*n)
            .map(|n| Some(SizeSpec::Fixed(n)))
            .map_err(|_| FormatError::invalid_value(ctx, "size", "non-negative int", n.to_string())),
        Some(Literal::Str(field)) => Ok(Some(SizeSpec::Field(field.clone()))),
        Some(other) => Err(FormatError::invalid_value(
            ctx,
            "size",
            "int or field name",
            other.kind(),
        )),
    }
}

fn required_str<'a>(descriptor: &'a Literal, key: &str, ctx: &str) -> Result<&'a str, FormatError> {
    let lit = descriptor
        .get(key)
        .ok_or_else(|| FormatError::missing_key(ctx, key))?;
    lit.as_str()
        .ok_or_else(|| FormatError::invalid_value(ctx, key, "str", lit.kind()))
}

fn required_int(descriptor: &Literal, key: &str, ctx: &str) -> Result<i64, FormatError> {
    let lit = descriptor
        .get(key)
        .ok_or_else(|| FormatError::missing_key(ctx, key))?;
    lit.as_int()
        .ok_or_else(|| FormatError::invalid_value(ctx, key, "int", lit.kind()))
}

fn unsupported_width(name: &str, kind: &str, width: i64) -> FormatError {
    FormatError::UnsupportedWidth {
        type_name: name.to_string(),
        kind: kind.to_string(),
        width,
    }
}
