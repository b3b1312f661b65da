use metajson_value::info::{MetaTypeId, TypeInfo};
use metajson_value::{ObjectRef, TypeRegistry, Variant};
use serde_json::Value;

use crate::converter::{ConvertHelper, Converter};
use crate::converters::invalid_value;
use crate::error::{DeserializeError, PathSegment, SerializeError};
use crate::kind::JsonKinds;

/// Built-in converter for registered list types.
///
/// Elements recurse through the engine with `[index]` path hints, so a
/// failure deep inside a nested list still names its exact location.
pub struct ListConverter;

fn element_of(types: &TypeRegistry, ty: MetaTypeId) -> Option<MetaTypeId> {
    match types.get(ty) {
        Some(TypeInfo::List(info)) => Some(info.element()),
        _ => None,
    }
}

impl Converter for ListConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        element_of(types, ty).is_some()
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::ARRAY
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        let Some(element) = element_of(helper.types(), ty) else {
            return Err(SerializeError::message("not a list type"));
        };
        let Variant::List(items) = value else {
            return Err(invalid_value(helper.types(), ty, value));
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            out.push(helper.serialize_subtype(element, item, PathSegment::Element(index))?);
        }
        Ok(Value::Array(out))
    }

    fn deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let Some(element) = element_of(helper.types(), ty) else {
            return Err(DeserializeError::message("not a list type"));
        };
        let Value::Array(items) = json else {
            return Err(DeserializeError::message("expected a JSON array"));
        };

        // Elements share the list's owner; a list does not own anything
        // itself.
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            out.push(helper.deserialize_subtype(element, item, owner, PathSegment::Element(index))?);
        }
        Ok(Variant::List(out))
    }
}

// -----------------------------------------------------------------------------
// Tests
