use std::fmt;

use metajson_value::{ObjectRef, TypeRegistry, Variant};
use metajson_value::info::{MetaTypeId, ScalarKind, TypeInfo};
use serde_json::{Number, Value};

use crate::converter::{ConvertHelper, Converter};
use crate::converters::{invalid_value, number_as_i64, number_as_u64};
use crate::error::{DeserializeError, DeserializeErrorKind, SerializeError};
use crate::kind::JsonKinds;

// Scalar converters are split by the JSON kind they accept, so the
// dispatcher's kind filter stays meaningful: a JSON string offered to an
// `int` target is a kind mismatch, not a converter failure.

fn scalar_kind_of(types: &TypeRegistry, ty: MetaTypeId) -> Option<ScalarKind> {
    match types.get(ty) {
        Some(TypeInfo::Scalar(info)) => Some(info.scalar_kind()),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// BoolConverter

/// Built-in converter for the `bool` scalar type.
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        scalar_kind_of(types, ty) == Some(ScalarKind::Bool)
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::BOOL
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        match value {
            Variant::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(invalid_value(helper.types(), ty, other)),
        }
    }

    fn deserialize(
        &self,
        _ty: MetaTypeId,
        json: &Value,
        _owner: Option<&ObjectRef>,
        _helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        match json {
            Value::Bool(b) => Ok(Variant::Bool(*b)),
            _ => Err(DeserializeError::message("expected a JSON bool")),
        }
    }
}

// -----------------------------------------------------------------------------
// NumberConverter

/// Built-in converter for the numeric scalar types `int`, `uint` and
/// `float`.
///
/// Serialization coerces between the numeric storages where the value fits
/// (`int` ↔ `uint` in range, either into `float`); deserialization narrows
/// with range and fraction checks, so `-1` into `uint` and `2.5` into `int`
/// are data errors.
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        matches!(
            scalar_kind_of(types, ty),
            Some(ScalarKind::Int | ScalarKind::UInt | ScalarKind::Float)
        )
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::NUMBER
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        let Some(target) = scalar_kind_of(helper.types(), ty) else {
            return Err(SerializeError::message("not a scalar type"));
        };

        let out_of_range = |value: &dyn fmt::Display| {
            SerializeError::message(format!(
                "value {value} does not fit scalar type `{target}`"
            ))
        };

        match target {
            ScalarKind::Int => match value {
                Variant::Int(i) => Ok(Value::Number((*i).into())),
                Variant::UInt(u) => match i64::try_from(*u) {
                    Ok(i) => Ok(Value::Number(i.into())),
                    Err(_) => Err(out_of_range(u)),
                },
                other => Err(invalid_value(helper.types(), ty, other)),
            },
            ScalarKind::UInt => match value {
                Variant::UInt(u) => Ok(Value::Number((*u).into())),
                Variant::Int(i) => match u64::try_from(*i) {
                    Ok(u) => Ok(Value::Number(u.into())),
                    Err(_) => Err(out_of_range(i)),
                },
                other => Err(invalid_value(helper.types(), ty, other)),
            },
            ScalarKind::Float => match value {
                Variant::Float(f) => match Number::from_f64(*f) {
                    Some(number) => Ok(Value::Number(number)),
                    None => Err(SerializeError::message(format!(
                        "non-finite number {f} cannot be written as JSON"
                    ))),
                },
                Variant::Int(i) => Ok(Value::Number((*i).into())),
                Variant::UInt(u) => Ok(Value::Number((*u).into())),
                other => Err(invalid_value(helper.types(), ty, other)),
            },
            _ => Err(SerializeError::message("not a numeric scalar type")),
        }
    }

    fn deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        _owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let Value::Number(number) = json else {
            return Err(DeserializeError::message("expected a JSON number"));
        };
        let Some(target) = scalar_kind_of(helper.types(), ty) else {
            return Err(DeserializeError::message("not a scalar type"));
        };

        let out_of_range = || {
            DeserializeError::new(DeserializeErrorKind::InvalidNumber {
                target,
                number: number.to_string().into(),
            })
        };

        match target {
            ScalarKind::Int => number_as_i64(number)
                .map(Variant::Int)
                .ok_or_else(out_of_range),
            ScalarKind::UInt => number_as_u64(number)
                .map(Variant::UInt)
                .ok_or_else(out_of_range),
            ScalarKind::Float => number
                .as_f64()
                .map(Variant::Float)
                .ok_or_else(out_of_range),
            _ => Err(DeserializeError::message("not a numeric scalar type")),
        }
    }
}

// -----------------------------------------------------------------------------
// StringConverter

/// Built-in converter for the `string` scalar type.
pub struct StringConverter;

impl Converter for StringConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        scalar_kind_of(types, ty) == Some(ScalarKind::Str)
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::STRING
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        match value {
            Variant::Str(s) => Ok(Value::String(s.clone())),
            other => Err(invalid_value(helper.types(), ty, other)),
        }
    }

    fn deserialize(
        &self,
        _ty: MetaTypeId,
        json: &Value,
        _owner: Option<&ObjectRef>,
        _helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        match json {
            Value::String(s) => Ok(Variant::Str(s.clone())),
            _ => Err(DeserializeError::message("expected a JSON string")),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::Config;
    use crate::driver::ConvertDriver;
    use crate::error::SerializeErrorKind;
    use crate::registry::ConverterRegistry;

    fn fixture() -> (TypeRegistry, ConverterRegistry) {
        (TypeRegistry::new(), ConverterRegistry::with_builtins())
    }

    #[test]
    fn round_trips_by_kind() {
        let (types, converters) = fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let cases = [
            (types.scalar(ScalarKind::Bool), Variant::Bool(true), json!(true)),
            (types.scalar(ScalarKind::Int), Variant::Int(-7), json!(-7)),
            (types.scalar(ScalarKind::UInt), Variant::UInt(7), json!(7)),
            (
                types.scalar(ScalarKind::Float),
                Variant::Float(1.25),
                json!(1.25),
            ),
            (
                types.scalar(ScalarKind::Str),
                Variant::Str("hi".into()),
                json!("hi"),
            ),
        ];

        for (ty, variant, expected) in cases {
            let json = driver.serialize_root(ty, &variant).unwrap();
            assert_eq!(json, expected);
            let back = driver.deserialize_root(ty, &json, None).unwrap();
            assert_eq!(back, variant);
        }
    }

    #[test]
    fn numeric_cross_storage_serializes() {
        let (types, converters) = fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        // A uint-typed property may well hold an `Int` variant.
        let uint = types.scalar(ScalarKind::UInt);
        assert_eq!(driver.serialize_root(uint, &Variant::Int(5)).unwrap(), json!(5));

        let float = types.scalar(ScalarKind::Float);
        assert_eq!(
            driver.serialize_root(float, &Variant::Int(2)).unwrap(),
            json!(2)
        );

        // Cross-coercion still checks range.
        let err = driver.serialize_root(uint, &Variant::Int(-1)).unwrap_err();
        assert!(matches!(err.kind, SerializeErrorKind::Message(_)));
    }

    #[test]
    fn narrowing_checks_on_read() {
        let (types, converters) = fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let int = types.scalar(ScalarKind::Int);
        let uint = types.scalar(ScalarKind::UInt);

        // Integral float narrows.
        assert_eq!(
            driver.deserialize_root(int, &json!(3.0), None).unwrap(),
            Variant::Int(3)
        );
        // Fractional float does not.
        let err = driver.deserialize_root(int, &json!(2.5), None).unwrap_err();
        assert!(matches!(
            err.kind,
            DeserializeErrorKind::InvalidNumber { .. }
        ));
        // Negative numbers never fit uint.
        let err = driver.deserialize_root(uint, &json!(-1), None).unwrap_err();
        assert!(matches!(
            err.kind,
            DeserializeErrorKind::InvalidNumber { .. }
        ));
    }

    #[test]
    fn one_past_the_integer_range_is_rejected() {
        let (types, converters) = fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let int = types.scalar(ScalarKind::Int);
        let uint = types.scalar(ScalarKind::UInt);

        // The extremes themselves arrive through the integer storages.
        assert_eq!(
            driver.deserialize_root(int, &json!(i64::MAX), None).unwrap(),
            Variant::Int(i64::MAX)
        );
        assert_eq!(
            driver.deserialize_root(uint, &json!(u64::MAX), None).unwrap(),
            Variant::UInt(u64::MAX)
        );

        // One past lands in the float fallback and must error, not saturate.
        let above_int: Value = serde_json::from_str("9223372036854775808").unwrap();
        let err = driver.deserialize_root(int, &above_int, None).unwrap_err();
        assert!(matches!(
            err.kind,
            DeserializeErrorKind::InvalidNumber { .. }
        ));

        let above_uint: Value = serde_json::from_str("18446744073709551616").unwrap();
        let err = driver.deserialize_root(uint, &above_uint, None).unwrap_err();
        assert!(matches!(
            err.kind,
            DeserializeErrorKind::InvalidNumber { .. }
        ));
    }

    #[test]
    fn wrong_variant_kind_is_a_serialize_error() {
        let (types, converters) = fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let int = types.scalar(ScalarKind::Int);
        let err = driver
            .serialize_root(int, &Variant::Str("nope".into()))
            .unwrap_err();
        assert!(matches!(err.kind, SerializeErrorKind::InvalidValue { .. }));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let (types, converters) = fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let float = types.scalar(ScalarKind::Float);
        let err = driver
            .serialize_root(float, &Variant::Float(f64::NAN))
            .unwrap_err();
        assert!(matches!(err.kind, SerializeErrorKind::Message(_)));
    }
}
