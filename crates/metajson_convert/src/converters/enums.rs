use metajson_value::info::{EnumInfo, MetaTypeId, TypeInfo};
use metajson_value::{ObjectRef, TypeRegistry, Variant};
use serde_json::Value;

use crate::converter::{ConvertHelper, Converter};
use crate::converters::{invalid_value, number_as_i64};
use crate::error::{DeserializeError, DeserializeErrorKind, SerializeError};
use crate::kind::JsonKinds;

/// Built-in converter for registered enum types.
///
/// Enums write as their numeric value by default and as their item name
/// under [`Config::enum_as_string`]. Flag sets join item names with `|`,
/// so `READ | WRITE` becomes `"read|write"`. Reading accepts both forms
/// regardless of configuration: numbers pass structurally, names resolve
/// strictly.
///
/// [`Config::enum_as_string`]: crate::Config::enum_as_string
pub struct EnumConverter;

fn enum_of<'a>(types: &'a TypeRegistry, ty: MetaTypeId) -> Option<&'a EnumInfo> {
    match types.get(ty) {
        Some(TypeInfo::Enum(info)) => Some(info),
        _ => None,
    }
}

fn write_flag_names(info: &EnumInfo, value: i64) -> Result<String, SerializeError> {
    if value == 0 {
        // The zero item's name if one is declared, the empty set otherwise.
        let name = info.item_by_value(0).map(|item| item.name().to_owned());
        return Ok(name.unwrap_or_default());
    }

    let mut names = Vec::new();
    let mut covered = 0_i64;
    for item in info.items() {
        let bits = item.value();
        if bits != 0 && value & bits == bits {
            names.push(item.name());
            covered |= bits;
        }
    }
    if covered != value {
        return Err(SerializeError::message(format!(
            "value {value} has bits not named by any item of flag enum `{}`",
            info.name()
        )));
    }
    Ok(names.join("|"))
}

fn read_flag_names(info: &EnumInfo, text: &str) -> Result<i64, DeserializeError> {
    if text.trim().is_empty() {
        return Ok(0);
    }

    let mut value = 0_i64;
    for name in text.split('|').map(str::trim) {
        let Some(item) = info.item(name) else {
            return Err(DeserializeError::new(DeserializeErrorKind::UnknownEnumItem {
                enumeration: info.name().into(),
                item: name.into(),
            }));
        };
        value |= item.value();
    }
    Ok(value)
}

impl Converter for EnumConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        enum_of(types, ty).is_some()
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::NUMBER.union(JsonKinds::STRING)
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        let Some(info) = enum_of(helper.types(), ty) else {
            return Err(SerializeError::message("not an enum type"));
        };
        let numeric = match value {
            Variant::Int(i) => *i,
            Variant::UInt(u) => match i64::try_from(*u) {
                Ok(i) => i,
                Err(_) => {
                    return Err(SerializeError::message(format!(
                        "value {u} does not fit enum `{}`",
                        info.name()
                    )));
                }
            },
            other => return Err(invalid_value(helper.types(), ty, other)),
        };

        if !helper.config().enum_as_string {
            return Ok(Value::Number(numeric.into()));
        }

        if info.is_flags() {
            return Ok(Value::String(write_flag_names(info, numeric)?));
        }
        match info.item_by_value(numeric) {
            Some(item) => Ok(Value::String(item.name().to_owned())),
            None => Err(SerializeError::message(format!(
                "value {numeric} names no item of enum `{}`",
                info.name()
            ))),
        }
    }

    fn deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        _owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let Some(info) = enum_of(helper.types(), ty) else {
            return Err(DeserializeError::message("not an enum type"));
        };

        match json {
            // Numbers pass structurally; membership is the model's concern.
            Value::Number(number) => match number_as_i64(number) {
                Some(value) => Ok(Variant::Int(value)),
                None => Err(DeserializeError::message(format!(
                    "number {number} is not an integral value for enum `{}`",
                    info.name()
                ))),
            },
            Value::String(text) => {
                if info.is_flags() {
                    return Ok(Variant::Int(read_flag_names(info, text)?));
                }
                match info.item(text) {
                    Some(item) => Ok(Variant::Int(item.value())),
                    None => Err(DeserializeError::new(
                        DeserializeErrorKind::UnknownEnumItem {
                            enumeration: info.name().into(),
                            item: text.as_str().into(),
                        },
                    )),
                }
            }
            _ => Err(DeserializeError::message("expected a JSON number or string")),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
