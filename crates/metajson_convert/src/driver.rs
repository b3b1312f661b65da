use std::cell::RefCell;

use metajson_value::{ObjectRef, TypeRegistry, Variant};
use metajson_value::info::{MetaTypeId, TypeKind};
use serde_json::Value;

use crate::config::Config;
use crate::converter::ConvertHelper;
use crate::error::{DeserializeError, DeserializeErrorKind, PathSegment};
use crate::error::{SerializeError, SerializeErrorKind, ValuePath};
use crate::kind::{JsonKind, JsonKinds};
use crate::registry::{ConverterRegistry, SelectFailure};

// -----------------------------------------------------------------------------
// ConvertDriver

/// Per-call dispatch state.
///
/// A driver lives for exactly one top-level conversion: it borrows the two
/// registries (read guards held by the facade), owns the configuration
/// snapshot, and maintains the path stack converters extend through the
/// [`ConvertHelper`] methods.
pub(crate) struct ConvertDriver<'a> {
    types: &'a TypeRegistry,
    converters: &'a ConverterRegistry,
    config: Config,
    path: RefCell<ValuePath>,
}

impl<'a> ConvertDriver<'a> {
    pub(crate) fn new(
        types: &'a TypeRegistry,
        converters: &'a ConverterRegistry,
        config: Config,
    ) -> Self {
        Self {
            types,
            converters,
            config,
            path: RefCell::new(ValuePath::new()),
        }
    }

    fn stamp_serialize(&self, mut err: SerializeError) -> SerializeError {
        err.stamp(&self.path.borrow());
        err
    }

    fn stamp_deserialize(&self, mut err: DeserializeError) -> DeserializeError {
        err.stamp(&self.path.borrow());
        err
    }

    fn type_label(&self, ty: MetaTypeId) -> Box<str> {
        match self.types.name_of(ty) {
            Some(name) => name.into(),
            None => ty.to_string().into(),
        }
    }

    // -------------------------------------------------------------------------
    // Serialization

    pub(crate) fn serialize_root(
        &self,
        ty: MetaTypeId,
        value: &Variant,
    ) -> Result<Value, SerializeError> {
        let Some(name) = self.types.name_of(ty) else {
            return Err(SerializeError::new(SerializeErrorKind::UnresolvedType {
                ty,
            }));
        };
        self.path.borrow_mut().push(PathSegment::Root(name.into()));
        let result = self.dispatch_serialize(ty, value);
        let result = result.map_err(|err| self.stamp_serialize(err));
        self.path.borrow_mut().pop();
        result
    }

    fn dispatch_serialize(&self, ty: MetaTypeId, value: &Variant) -> Result<Value, SerializeError> {
        let Some(info) = self.types.get(ty) else {
            return Err(SerializeError::new(SerializeErrorKind::UnresolvedType {
                ty,
            }));
        };

        // Strict nulls for everything but classes are enforced here once;
        // the object converter owns the reference/value split itself.
        if value.is_null() && info.kind() != TypeKind::Class {
            return if self.config.allow_default_null {
                Ok(Value::Null)
            } else {
                Err(SerializeError::new(SerializeErrorKind::NullValue {
                    type_name: info.name().into(),
                }))
            };
        }

        let Some(record) = self.converters.select_serializer(self.types, ty) else {
            return Err(SerializeError::new(SerializeErrorKind::NoConverter {
                type_name: info.name().into(),
            }));
        };
        record.converter().serialize(ty, value, self)
    }

    // -------------------------------------------------------------------------
    // Deserialization

    pub(crate) fn deserialize_root(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
    ) -> Result<Variant, DeserializeError> {
        let Some(name) = self.types.name_of(ty) else {
            return Err(DeserializeError::new(
                DeserializeErrorKind::UnresolvedType { ty },
            ));
        };
        self.path.borrow_mut().push(PathSegment::Root(name.into()));
        let result = self.dispatch_deserialize(ty, json, owner);
        let result = result.map_err(|err| self.stamp_deserialize(err));
        self.path.borrow_mut().pop();
        result
    }

    fn dispatch_deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
    ) -> Result<Variant, DeserializeError> {
        if !self.types.contains(ty) {
            return Err(DeserializeError::new(
                DeserializeErrorKind::UnresolvedType { ty },
            ));
        }

        let kind = JsonKind::of(json);
        match self.converters.select_deserializer(self.types, ty, kind) {
            Ok(record) => record.converter().deserialize(ty, json, owner, self),
            Err(SelectFailure::NoConverter) => {
                Err(DeserializeError::new(DeserializeErrorKind::NoConverter {
                    type_name: self.type_label(ty),
                }))
            }
            Err(SelectFailure::KindMismatch { expected }) => {
                // Converters exist but none accepts this shape. A null input
                // may still fall back to the type's default value.
                if kind == JsonKind::Null && self.config.allow_default_null {
                    return self
                        .types
                        .default_value(ty)
                        .map_err(DeserializeError::new);
                }
                Err(DeserializeError::new(DeserializeErrorKind::KindMismatch {
                    expected,
                    actual: kind,
                }))
            }
        }
    }

    // -------------------------------------------------------------------------
    // In-place population

    /// Populates an existing instance from a JSON object, using the
    /// instance's own class. No discriminator is consulted and nothing is
    /// constructed.
    pub(crate) fn populate_root(
        &self,
        target: &ObjectRef,
        json: &Value,
    ) -> Result<(), DeserializeError> {
        let class_id = target.class();
        let Some(name) = self.types.name_of(class_id) else {
            return Err(DeserializeError::new(
                DeserializeErrorKind::UnresolvedType { ty: class_id },
            ));
        };
        let Value::Object(map) = json else {
            return Err(DeserializeError::new(DeserializeErrorKind::KindMismatch {
                expected: JsonKinds::OBJECT,
                actual: JsonKind::of(json),
            }));
        };

        self.path.borrow_mut().push(PathSegment::Root(name.into()));
        let result = crate::converters::populate_instance(self, class_id, target, None, map)
            .map_err(|err| self.stamp_deserialize(err));
        self.path.borrow_mut().pop();
        result
    }
}

// -----------------------------------------------------------------------------
// ConvertHelper

impl ConvertHelper for ConvertDriver<'_> {
    fn types(&self) -> &TypeRegistry {
        self.types
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn serialize_subtype(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        hint: PathSegment,
    ) -> Result<Value, SerializeError> {
        self.path.borrow_mut().push(hint);
        let result = self.dispatch_serialize(ty, value);
        let result = result.map_err(|err| self.stamp_serialize(err));
        self.path.borrow_mut().pop();
        result
    }

    fn deserialize_subtype(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
        hint: PathSegment,
    ) -> Result<Variant, DeserializeError> {
        self.path.borrow_mut().push(hint);
        let result = self.dispatch_deserialize(ty, json, owner);
        let result = result.map_err(|err| self.stamp_deserialize(err));
        self.path.borrow_mut().pop();
        result
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use metajson_value::info::ScalarKind;

    fn driver_fixture() -> (TypeRegistry, ConverterRegistry) {
        (TypeRegistry::new(), ConverterRegistry::with_builtins())
    }

    #[test]
    fn root_errors_carry_the_type_name() {
        let (types, converters) = driver_fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let int = types.scalar(ScalarKind::Int);
        let err = driver
            .deserialize_root(int, &Value::Bool(true), None)
            .unwrap_err();
        assert!(matches!(
            err.kind,
            DeserializeErrorKind::KindMismatch { .. }
        ));
        assert_eq!(err.path.to_string(), "int");
    }

    #[test]
    fn null_falls_back_to_default_when_permitted() {
        let (types, converters) = driver_fixture();

        let config = Config {
            allow_default_null: true,
            ..Config::default()
        };
        let driver = ConvertDriver::new(&types, &converters, config);

        let int = types.scalar(ScalarKind::Int);
        let value = driver.deserialize_root(int, &Value::Null, None).unwrap();
        assert_eq!(value, Variant::Int(0));
    }

    #[test]
    fn null_is_rejected_by_default() {
        let (types, converters) = driver_fixture();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let int = types.scalar(ScalarKind::Int);
        let err = driver.deserialize_root(int, &Value::Null, None).unwrap_err();
        assert!(matches!(
            err.kind,
            DeserializeErrorKind::KindMismatch { .. }
        ));
    }

    #[test]
    fn serialize_null_strictness() {
        let (types, converters) = driver_fixture();
        let int = types.scalar(ScalarKind::Int);

        let driver = ConvertDriver::new(&types, &converters, Config::default());
        let err = driver.serialize_root(int, &Variant::Null).unwrap_err();
        assert!(matches!(err.kind, SerializeErrorKind::NullValue { .. }));

        let config = Config {
            allow_default_null: true,
            ..Config::default()
        };
        let driver = ConvertDriver::new(&types, &converters, config);
        let json = driver.serialize_root(int, &Variant::Null).unwrap();
        assert_eq!(json, Value::Null);
    }

    #[test]
    fn empty_converter_registry_reports_no_converter() {
        let types = TypeRegistry::new();
        let converters = ConverterRegistry::new();
        let driver = ConvertDriver::new(&types, &converters, Config::default());

        let int = types.scalar(ScalarKind::Int);
        let err = driver
            .deserialize_root(int, &Value::from(1), None)
            .unwrap_err();
        assert!(matches!(err.kind, DeserializeErrorKind::NoConverter { .. }));

        let err = driver.serialize_root(int, &Variant::Int(1)).unwrap_err();
        assert!(matches!(err.kind, SerializeErrorKind::NoConverter { .. }));
    }
}
