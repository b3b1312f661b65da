use metajson_value::info::{ClassInfo, MetaTypeId, ObjectKind, TypeInfo};
use metajson_value::reserved::CLASS_KEY;
use metajson_value::{ObjectRef, TypeRegistry, Variant};
use serde_json::{Map, Value};

use crate::config::{Polymorphism, ValidationFlags};
use crate::converter::{ConvertHelper, Converter};
use crate::converters::invalid_value;
use crate::error::{DeserializeError, DeserializeErrorKind, PathSegment};
use crate::error::{SerializeError, SerializeErrorKind};
use crate::kind::JsonKinds;

/// Built-in converter for registered class types.
///
/// This is the converter that carries the object model: property iteration
/// over the inheritance chain, the `@class` discriminator for polymorphic
/// hierarchies, per-kind null handling, ownership of constructed children,
/// and the opt-in validation of the input key set.
pub struct ObjectConverter;

fn class_of(types: &TypeRegistry, ty: MetaTypeId) -> Option<&ClassInfo> {
    match types.get(ty) {
        Some(TypeInfo::Class(info)) => Some(info),
        _ => None,
    }
}

fn label(types: &TypeRegistry, ty: MetaTypeId) -> Box<str> {
    match types.name_of(ty) {
        Some(name) => name.into(),
        None => ty.to_string().into(),
    }
}

// -----------------------------------------------------------------------------
// Deserialization internals

/// Resolves the class to construct from the `@class` discriminator, honoring
/// the polymorphism mode. `Disabled` never consults the marker, `Enabled`
/// follows it when present, `Forced` requires it.
fn resolve_discriminator(
    types: &TypeRegistry,
    declared: &ClassInfo,
    ty: MetaTypeId,
    map: &Map<String, Value>,
    polymorphism: Polymorphism,
) -> Result<MetaTypeId, DeserializeError> {
    if polymorphism == Polymorphism::Disabled {
        return Ok(ty);
    }

    let Some(marker) = map.get(CLASS_KEY) else {
        return match polymorphism {
            Polymorphism::Forced => Err(DeserializeError::new(
                DeserializeErrorKind::MissingDiscriminator {
                    type_name: declared.name().into(),
                },
            )),
            _ => Ok(ty),
        };
    };

    let Value::String(name) = marker else {
        return Err(DeserializeError::message("`@class` must be a JSON string"));
    };
    let Some(target) = types.resolve_name(name) else {
        return Err(DeserializeError::new(DeserializeErrorKind::UnknownClass {
            name: name.as_str().into(),
        }));
    };
    if !types.is_same_or_descendant(target, ty) {
        return Err(DeserializeError::new(DeserializeErrorKind::UnrelatedClass {
            actual: name.as_str().into(),
            declared: declared.name().into(),
        }));
    }
    Ok(target)
}

/// Writes every matching input key into an existing instance.
///
/// Shared between regular deserialization and in-place population: the
/// caller resolved `class` (from the discriminator or from the instance
/// itself) and constructed `instance`. Reference-class instances own
/// whatever is built below them; value classes pass `owner` through.
pub(crate) fn populate_instance(
    helper: &dyn ConvertHelper,
    class: MetaTypeId,
    instance: &ObjectRef,
    owner: Option<&ObjectRef>,
    map: &Map<String, Value>,
) -> Result<(), DeserializeError> {
    let types = helper.types();
    let Some(info) = class_of(types, class) else {
        return Err(DeserializeError::message("not a class type"));
    };

    let child_owner = match info.object_kind() {
        ObjectKind::Reference => Some(instance),
        ObjectKind::Value => owner,
    };
    let validation = helper.config().validation;

    for (key, entry) in map {
        if key == CLASS_KEY {
            continue;
        }
        let Some(property) = types.find_property(class, key).filter(|p| p.writable()) else {
            if validation.contains(ValidationFlags::NO_EXTRA_PROPERTIES) {
                return Err(DeserializeError::new(DeserializeErrorKind::ExtraProperty {
                    class: info.name().into(),
                    property: key.as_str().into(),
                }));
            }
            continue;
        };
        let value = helper.deserialize_subtype(
            property.ty(),
            entry,
            child_owner,
            PathSegment::Member(key.as_str().into()),
        )?;
        instance.set_property(property.name(), value);
    }

    if validation.contains(ValidationFlags::ALL_PROPERTIES) {
        for property in types.chain_properties(class) {
            if !property.writable() || property.is_object_name() {
                continue;
            }
            if !map.contains_key(property.name()) {
                return Err(DeserializeError::new(
                    DeserializeErrorKind::MissingProperty {
                        class: info.name().into(),
                        property: property.name().into(),
                    },
                ));
            }
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// ObjectConverter

impl Converter for ObjectConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        class_of(types, ty).is_some()
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::OBJECT.union(JsonKinds::NULL)
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        let types = helper.types();
        let config = helper.config();
        let Some(declared) = class_of(types, ty) else {
            return Err(SerializeError::message("not a class type"));
        };

        // Class types own their null policy; the engine-wide one only
        // covers the other kinds.
        if value.is_null() {
            return match declared.object_kind() {
                ObjectKind::Reference => Ok(Value::Null),
                ObjectKind::Value if config.allow_default_null => Ok(Value::Object(Map::new())),
                ObjectKind::Value => Err(SerializeError::new(SerializeErrorKind::NullValue {
                    type_name: declared.name().into(),
                })),
            };
        }

        let Variant::Object(instance) = value else {
            return Err(invalid_value(types, ty, value));
        };

        let actual_id = instance.class();
        let actual = match class_of(types, actual_id) {
            Some(class) if types.is_same_or_descendant(actual_id, ty) => class,
            _ => {
                return Err(SerializeError::new(SerializeErrorKind::UnrelatedClass {
                    actual: label(types, actual_id),
                    declared: declared.name().into(),
                }));
            }
        };

        let polymorphic = match config.polymorphism {
            Polymorphism::Disabled => false,
            Polymorphism::Forced => true,
            Polymorphism::Enabled => instance
                .read()
                .polymorphism_override()
                .unwrap_or_else(|| types.polymorphic_in_chain(actual_id)),
        };

        let mut out = Map::new();
        if polymorphic {
            out.insert(CLASS_KEY.to_owned(), Value::String(actual.name().to_owned()));
        }

        // Polymorphic output carries the actual class's full property
        // surface; otherwise subtype-only properties are ignored.
        let written = if polymorphic { actual_id } else { ty };
        let object = instance.read();
        for property in types.chain_properties(written) {
            if !property.readable() {
                continue;
            }
            if property.is_object_name() && !config.keep_object_name {
                continue;
            }

            let fallback;
            let stored = match object.property(property.name()) {
                Some(value) => value,
                None => {
                    // Never set on this instance; write the type's default.
                    fallback = types
                        .default_value(property.ty())
                        .map_err(|err| SerializeError::message(err.to_string()))?;
                    &fallback
                }
            };
            let json = helper.serialize_subtype(
                property.ty(),
                stored,
                PathSegment::Member(property.name().into()),
            )?;
            out.insert(property.name().to_owned(), json);
        }
        drop(object);

        Ok(Value::Object(out))
    }

    fn deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let types = helper.types();
        let config = helper.config();
        let Some(declared) = class_of(types, ty) else {
            return Err(DeserializeError::message("not a class type"));
        };

        if json.is_null() {
            return match declared.object_kind() {
                ObjectKind::Reference => Ok(Variant::Null),
                ObjectKind::Value if config.allow_default_null => {
                    let instance = types.construct(ty, owner).map_err(DeserializeError::new)?;
                    Ok(Variant::Object(instance))
                }
                ObjectKind::Value => Err(DeserializeError::new(DeserializeErrorKind::NullValue {
                    type_name: declared.name().into(),
                })),
            };
        }

        let Value::Object(map) = json else {
            return Err(DeserializeError::message("expected a JSON object"));
        };

        let target = resolve_discriminator(types, declared, ty, map, config.polymorphism)?;
        let instance = types.construct(target, owner).map_err(DeserializeError::new)?;
        populate_instance(helper, target, &instance, owner, map)?;
        Ok(Variant::Object(instance))
    }
}

// -----------------------------------------------------------------------------
// Tests
