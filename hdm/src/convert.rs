//! Final-type conversion of raw integers and condition tests.

use hdm_core::{DecodeError, EnumMember, FlagSet, Value};
use hdm_schema::{EnumDef, Expected, FlagDef};

/// Maps a raw integer to its enum member.
///
/// # Errors
/// Returns [`DecodeError::InvalidEnumValue`] if no member has that ordinal.
pub fn enum_value(def: &EnumDef, raw: i64) -> Result<Value, DecodeError> {
    let member = def.member(raw).ok_or_else(|| DecodeError::InvalidEnumValue {
        type_name: def.name.clone(),
        value: raw,
    })?;
    Ok(Value::Enum(EnumMember {
        type_name: def.name.clone(),
        name: member.name.clone(),
        ordinal: member.ordinal,
    }))
}

/// Expands a raw integer into named flags by testing each declared bit.
#[must_use]
pub fn flag_value(def: &FlagDef, raw: i64) -> Value {
    Value::Flags(FlagSet::new(def.name.clone(), raw, def.expand(raw)))
}

/// Tests a decoded sibling against a condition's expected value.
///
/// Enum members match by name (or ordinal), flag sets by testing the named
/// flag, integers by equality. Any other pairing is false.
///
/// # Errors
/// Returns [`DecodeError::UnknownFlag`] when a flag set is tested for a
/// flag its type does not define.
pub fn condition_holds(value: &Value, expected: &Expected) -> Result<bool, DecodeError> {
    let holds = match (value, expected) {
        (Value::Enum(member), Expected::Name(name)) => member.name == *name,
        (Value::Enum(member), Expected::Int(ordinal)) => member.ordinal == *ordinal,
        (Value::Flags(flags), Expected::Name(name)) => {
            flags.get(name).ok_or_else(|| DecodeError::UnknownFlag {
                type_name: flags.type_name().to_string(),
                flag: name.clone(),
            })?
        }
        (Value::Flags(flags), Expected::Bool(b)) => (flags.raw() != 0) == *b,
        (Value::Int(v), Expected::Int(e)) => v == e,
        (Value::Int(v), Expected::Bool(b)) => (*v != 0) == *b,
        _ => false,
    };
    Ok(holds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdm_core::ScalarFormat;
    use hdm_schema::{EnumValue, FlagBit};

    fn digits() -> EnumDef {
        let mut def = EnumDef::new("Digit".to_string(), ScalarFormat::Uint8);
        for (i, name) in ["ZERO", "ONE", "TWO"].iter().enumerate() {
            def.add_member(EnumValue::new((*name).to_string(), i as i64));
        }
        def
    }

    fn abc() -> FlagDef {
        let mut def = FlagDef::new("Mode".to_string(), ScalarFormat::Uint8);
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            def.add_bit(FlagBit::new((*name).to_string(), i as u32));
        }
        def
    }

    #[test]
    fn test_enum_value_by_ordinal() {
        let value = enum_value(&digits(), 1).unwrap();
        assert_eq!(value.as_enum().map(|m| m.name.as_str()), Some("ONE"));
    }

    #[test]
    fn test_enum_value_unknown_ordinal() {
        assert_eq!(
            enum_value(&digits(), 9),
            Err(DecodeError::InvalidEnumValue {
                type_name: "Digit".to_string(),
                value: 9,
            })
        );
    }

    #[test]
    fn test_flag_value_expands_bits() {
        let value = flag_value(&abc(), 5);
        let flags = value.as_flags().unwrap();
        assert_eq!(flags.get("A"), Some(true));
        assert_eq!(flags.get("B"), Some(false));
        assert_eq!(flags.get("C"), Some(true));
        assert_eq!(flags.raw(), 5);
    }

    #[test]
    fn test_condition_on_enum() {
        let two = enum_value(&digits(), 2).unwrap();
        assert!(condition_holds(&two, &Expected::Name("TWO".to_string())).unwrap());
        assert!(!condition_holds(&two, &Expected::Name("ONE".to_string())).unwrap());
        assert!(condition_holds(&two, &Expected::Int(2)).unwrap());
    }

    #[test]
    fn test_condition_on_flags() {
        let flags = flag_value(&abc(), 0b010);
        assert!(condition_holds(&flags, &Expected::Name("B".to_string())).unwrap());
        assert!(!condition_holds(&flags, &Expected::Name("A".to_string())).unwrap());
        assert!(condition_holds(&flags, &Expected::Bool(true)).unwrap());
        assert!(matches!(
            condition_holds(&flags, &Expected::Name("Z".to_string())),
            Err(DecodeError::UnknownFlag { .. })
        ));
    }

    #[test]
    fn test_condition_on_ints() {
        assert!(condition_holds(&Value::Int(3), &Expected::Int(3)).unwrap());
        assert!(!condition_holds(&Value::Int(3), &Expected::Int(4)).unwrap());
        assert!(condition_holds(&Value::Int(0), &Expected::Bool(false)).unwrap());
        assert!(!condition_holds(&Value::Float(1.0), &Expected::Int(1)).unwrap());
    }
}
