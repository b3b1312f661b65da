use std::collections::BTreeMap;

use metajson_value::info::{MetaTypeId, TypeInfo};
use metajson_value::{ObjectRef, TypeRegistry, Variant};
use serde_json::Value;

use crate::converter::{ConvertHelper, Converter};
use crate::converters::invalid_value;
use crate::error::{DeserializeError, PathSegment, SerializeError};
use crate::kind::JsonKinds;

/// Built-in converter for registered map types.
///
/// Keys are always strings; values recurse through the engine with member
/// path hints. Keys pass through untouched, reserved markers included, since
/// a map is free-form data rather than a class shape.
pub struct MapConverter;

fn value_type_of(types: &TypeRegistry, ty: MetaTypeId) -> Option<MetaTypeId> {
    match types.get(ty) {
        Some(TypeInfo::Map(info)) => Some(info.value_type()),
        _ => None,
    }
}

impl Converter for MapConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        value_type_of(types, ty).is_some()
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::OBJECT
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        let Some(value_type) = value_type_of(helper.types(), ty) else {
            return Err(SerializeError::message("not a map type"));
        };
        let Variant::Map(entries) = value else {
            return Err(invalid_value(helper.types(), ty, value));
        };

        let mut out = serde_json::Map::with_capacity(entries.len());
        for (key, entry) in entries {
            let json =
                helper.serialize_subtype(value_type, entry, PathSegment::Member(key.as_str().into()))?;
            out.insert(key.clone(), json);
        }
        Ok(Value::Object(out))
    }

    fn deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let Some(value_type) = value_type_of(helper.types(), ty) else {
            return Err(DeserializeError::message("not a map type"));
        };
        let Value::Object(entries) = json else {
            return Err(DeserializeError::message("expected a JSON object"));
        };

        // Entries share the map's owner, same as list elements.
        let mut out = BTreeMap::new();
        for (key, entry) in entries {
            let value = helper.deserialize_subtype(
                value_type,
                entry,
                owner,
                PathSegment::Member(key.as_str().into()),
            )?;
            out.insert(key.clone(), value);
        }
        Ok(Variant::Map(out))
    }
}

// -----------------------------------------------------------------------------
// Tests
