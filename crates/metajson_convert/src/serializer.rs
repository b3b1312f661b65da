use std::fmt;
use std::io;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use metajson_value::info::MetaTypeId;
use metajson_value::{ObjectRef, TypeRegistryArc, TypedValue};
use serde_json::Value;

use crate::config::{Config, JsonFormat, LocaleEncoding, Polymorphism, ValidationFlags};
use crate::converter::Converter;
use crate::driver::ConvertDriver;
use crate::error::{DeserializeError, DeserializeErrorKind};
use crate::error::{SerializeError, SerializeErrorKind};
use crate::registry::ConverterRegistry;

/// The serializer facade: shared type metadata, a converter registry, and
/// the active configuration, bundled behind one thread-safe handle.
///
/// Each conversion call snapshots the configuration and takes read guards
/// on both registries, so concurrent calls never interfere and setter
/// writes between calls take effect on the next call only.
pub struct JsonSerializer {
    types: TypeRegistryArc,
    converters: RwLock<ConverterRegistry>,
    config: RwLock<Config>,
}

impl JsonSerializer {
    /// Creates a serializer over the given type metadata, with the built-in
    /// converters registered.
    pub fn new(types: TypeRegistryArc) -> Self {
        Self {
            types,
            converters: RwLock::new(ConverterRegistry::with_builtins()),
            config: RwLock::new(Config::default()),
        }
    }

    /// The shared type metadata handle.
    #[inline]
    pub fn types(&self) -> &TypeRegistryArc {
        &self.types
    }

    fn converters(&self) -> RwLockReadGuard<'_, ConverterRegistry> {
        self.converters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn config_mut(&self) -> RwLockWriteGuard<'_, Config> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a custom converter.
    ///
    /// The new converter outranks the built-ins for the types it claims:
    /// equal-priority ties go to the latest registration, and a higher
    /// [`priority`](Converter::priority) wins outright.
    pub fn add_converter<C: Converter + 'static>(&self, converter: C) {
        self.converters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(converter);
    }

    // -------------------------------------------------------------------------
    // Configuration

    /// The active configuration.
    pub fn config(&self) -> Config {
        *self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the whole configuration.
    pub fn set_config(&self, config: Config) {
        *self.config_mut() = config;
    }

    /// Whether nulls for non-nullable types fall back to defaults.
    pub fn set_allow_default_null(&self, allow: bool) {
        self.config_mut().allow_default_null = allow;
    }

    /// Whether the object-name property is written.
    pub fn set_keep_object_name(&self, keep: bool) {
        self.config_mut().keep_object_name = keep;
    }

    /// Whether enums write as item names instead of numbers.
    pub fn set_enum_as_string(&self, by_name: bool) {
        self.config_mut().enum_as_string = by_name;
    }

    /// Whether base64 input is validated strictly.
    pub fn set_validate_base64(&self, validate: bool) {
        self.config_mut().validate_base64 = validate;
    }

    /// How locale tags are written.
    pub fn set_locale_encoding(&self, encoding: LocaleEncoding) {
        self.config_mut().locale_encoding = encoding;
    }

    /// Which input-key checks deserialization performs.
    pub fn set_validation(&self, validation: ValidationFlags) {
        self.config_mut().validation = validation;
    }

    /// How the `@class` discriminator is handled.
    pub fn set_polymorphism(&self, polymorphism: Polymorphism) {
        self.config_mut().polymorphism = polymorphism;
    }

    // -------------------------------------------------------------------------
    // Serialization

    /// Serializes a typed value into a JSON tree.
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, SerializeError> {
        let types = self.types.read();
        let converters = self.converters();
        let driver = ConvertDriver::new(&types, &converters, self.config());
        driver.serialize_root(value.ty, &value.value)
    }

    /// Serializes into JSON text.
    pub fn serialize_to_string(
        &self,
        value: &TypedValue,
        format: JsonFormat,
    ) -> Result<String, SerializeError> {
        let json = self.serialize(value)?;
        let text = match format {
            JsonFormat::Compact => serde_json::to_string(&json),
            JsonFormat::Pretty => serde_json::to_string_pretty(&json),
        };
        text.map_err(|err| SerializeError::new(SerializeErrorKind::Write(err)))
    }

    /// Serializes into JSON text bytes.
    pub fn serialize_to_vec(
        &self,
        value: &TypedValue,
        format: JsonFormat,
    ) -> Result<Vec<u8>, SerializeError> {
        self.serialize_to_string(value, format).map(String::into_bytes)
    }

    /// Serializes JSON text into a writer.
    pub fn serialize_to_writer(
        &self,
        writer: impl io::Write,
        value: &TypedValue,
        format: JsonFormat,
    ) -> Result<(), SerializeError> {
        let json = self.serialize(value)?;
        let written = match format {
            JsonFormat::Compact => serde_json::to_writer(writer, &json),
            JsonFormat::Pretty => serde_json::to_writer_pretty(writer, &json),
        };
        written.map_err(|err| SerializeError::new(SerializeErrorKind::Write(err)))
    }

    // -------------------------------------------------------------------------
    // Deserialization

    /// Deserializes a JSON tree as a value of the given type.
    ///
    /// Instances constructed along the way attach to `owner` when one is
    /// given.
    pub fn deserialize(
        &self,
        json: &Value,
        ty: MetaTypeId,
        owner: Option<&ObjectRef>,
    ) -> Result<TypedValue, DeserializeError> {
        let types = self.types.read();
        let converters = self.converters();
        let driver = ConvertDriver::new(&types, &converters, self.config());
        let value = driver.deserialize_root(ty, json, owner)?;
        Ok(TypedValue::new(ty, value))
    }

    /// Deserializes JSON text as a value of the given type.
    pub fn deserialize_from_str(
        &self,
        text: &str,
        ty: MetaTypeId,
        owner: Option<&ObjectRef>,
    ) -> Result<TypedValue, DeserializeError> {
        let json = serde_json::from_str(text)
            .map_err(|err| DeserializeError::new(DeserializeErrorKind::Parse(err)))?;
        self.deserialize(&json, ty, owner)
    }

    /// Deserializes JSON text bytes as a value of the given type.
    pub fn deserialize_from_slice(
        &self,
        bytes: &[u8],
        ty: MetaTypeId,
        owner: Option<&ObjectRef>,
    ) -> Result<TypedValue, DeserializeError> {
        let json = serde_json::from_slice(bytes)
            .map_err(|err| DeserializeError::new(DeserializeErrorKind::Parse(err)))?;
        self.deserialize(&json, ty, owner)
    }

    /// Deserializes JSON text from a reader as a value of the given type.
    pub fn deserialize_from_reader(
        &self,
        reader: impl io::Read,
        ty: MetaTypeId,
        owner: Option<&ObjectRef>,
    ) -> Result<TypedValue, DeserializeError> {
        let json = serde_json::from_reader(reader)
            .map_err(|err| DeserializeError::new(DeserializeErrorKind::Parse(err)))?;
        self.deserialize(&json, ty, owner)
    }

    /// Deserializes a JSON object into an existing instance, in place.
    ///
    /// The instance's own class decides the property set; no discriminator
    /// is consulted and no new instance is constructed. Properties absent
    /// from the input keep their current values.
    pub fn deserialize_into(
        &self,
        json: &Value,
        target: &ObjectRef,
    ) -> Result<(), DeserializeError> {
        let types = self.types.read();
        let converters = self.converters();
        let driver = ConvertDriver::new(&types, &converters, self.config());
        driver.populate_root(target, json)
    }
}

impl fmt::Debug for JsonSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSerializer")
            .field("types", &self.types)
            .field("converters", &self.converters().len())
            .field("config", &self.config())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use metajson_value::info::ScalarKind;
    use metajson_value::registry::{ClassDef, EnumDef};
    use metajson_value::{TypeRegistry, Variant};
    use serde_json::json;

    fn point_serializer() -> (JsonSerializer, MetaTypeId) {
        let mut types = TypeRegistry::new();
        let int = types.scalar(ScalarKind::Int);
        let point = types
            .register_class(ClassDef::value("Point").property("x", int).property("y", int))
            .unwrap();
        (JsonSerializer::new(TypeRegistryArc::new(types)), point)
    }

    #[test]
    fn round_trips_through_the_facade() {
        let (serializer, point) = point_serializer();

        let instance = {
            let types = serializer.types().read();
            let instance = types.construct(point, None).unwrap();
            instance.set_property("x", Variant::Int(4));
            instance.set_property("y", Variant::Int(2));
            instance
        };

        let value = TypedValue::new(point, instance);
        let json = serializer.serialize(&value).unwrap();
        assert_eq!(json, json!({"x": 4, "y": 2}));

        let back = serializer.deserialize(&json, point, None).unwrap();
        assert_eq!(back.ty, point);
        let Variant::Object(back) = back.value else {
            panic!("expected an instance");
        };
        assert_eq!(back.property("x"), Some(Variant::Int(4)));
    }

    #[test]
    fn text_forms_round_trip() {
        let (serializer, point) = point_serializer();

        let json = json!({"x": 1, "y": 2});
        let back = serializer
            .deserialize_from_str(&json.to_string(), point, None)
            .unwrap();
        let compact = serializer.serialize_to_string(&back, JsonFormat::Compact).unwrap();
        assert_eq!(compact, r#"{"x":1,"y":2}"#);

        let pretty = serializer.serialize_to_string(&back, JsonFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(
            serializer.serialize_to_vec(&back, JsonFormat::Compact).unwrap(),
            compact.clone().into_bytes()
        );

        let mut buffer = Vec::new();
        serializer
            .serialize_to_writer(&mut buffer, &back, JsonFormat::Compact)
            .unwrap();
        assert_eq!(buffer, compact.into_bytes());
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let (serializer, point) = point_serializer();

        let err = serializer
            .deserialize_from_str("{not json", point, None)
            .unwrap_err();
        assert!(matches!(err.kind, DeserializeErrorKind::Parse(_)));

        let err = serializer
            .deserialize_from_slice(b"[1,", point, None)
            .unwrap_err();
        assert!(matches!(err.kind, DeserializeErrorKind::Parse(_)));

        let err = serializer
            .deserialize_from_reader(&b"nope"[..], point, None)
            .unwrap_err();
        assert!(matches!(err.kind, DeserializeErrorKind::Parse(_)));
    }

    #[test]
    fn deserialize_into_updates_in_place() {
        let (serializer, point) = point_serializer();

        let instance = {
            let types = serializer.types().read();
            let instance = types.construct(point, None).unwrap();
            instance.set_property("x", Variant::Int(10));
            instance.set_property("y", Variant::Int(20));
            instance
        };

        serializer
            .deserialize_into(&json!({"y": 99}), &instance)
            .unwrap();
        assert_eq!(instance.property("x"), Some(Variant::Int(10)));
        assert_eq!(instance.property("y"), Some(Variant::Int(99)));
    }

    #[test]
    fn setters_apply_to_the_next_call() {
        let mut types = TypeRegistry::new();
        let color = types
            .register_enum(EnumDef::new("color").item("red", 0).item("green", 1))
            .unwrap();
        let serializer = JsonSerializer::new(TypeRegistryArc::new(types));

        let value = TypedValue::new(color, Variant::Int(1));
        assert_eq!(serializer.serialize(&value).unwrap(), json!(1));

        serializer.set_enum_as_string(true);
        assert_eq!(serializer.serialize(&value).unwrap(), json!("green"));
    }

    /// `Shape` with a `children` list of shapes, `Circle` as a subtype.
    fn scene_serializer() -> (JsonSerializer, MetaTypeId, MetaTypeId) {
        let mut types = TypeRegistry::new();
        let int = types.scalar(ScalarKind::Int);
        let shape = types
            .register_class(ClassDef::reference("Shape").polymorphic())
            .unwrap();
        let shapes = types.register_list(shape).unwrap();
        let scene = types
            .register_class(ClassDef::reference("Scene").property("children", shapes))
            .unwrap();
        let circle = types
            .register_class(ClassDef::reference("Circle").base(shape).property("r", int))
            .unwrap();
        (JsonSerializer::new(TypeRegistryArc::new(types)), scene, circle)
    }

    #[test]
    fn polymorphic_children_resolve_by_marker() {
        let (serializer, scene, circle) = scene_serializer();

        let json = json!({
            "children": [
                {"@class": "Circle", "r": 3},
                {"@class": "Circle", "r": 7},
            ],
        });
        let back = serializer.deserialize(&json, scene, None).unwrap();
        let Variant::Object(scene_instance) = back.value else {
            panic!("expected an instance");
        };
        let Some(Variant::List(children)) = scene_instance.property("children") else {
            panic!("expected a list");
        };
        let Some(Variant::Object(second)) = children.get(1).cloned() else {
            panic!("expected a nested instance");
        };
        assert_eq!(second.class(), circle);
        assert_eq!(second.property("r"), Some(Variant::Int(7)));
        // List elements parent to the enclosing reference object.
        assert!(second.parent().unwrap().ptr_eq(&scene_instance));
    }

    #[test]
    fn errors_name_the_failing_field() {
        let (serializer, scene, _) = scene_serializer();

        let json = json!({
            "children": [
                {"@class": "Circle", "r": 3},
                {"@class": "Circle", "r": "seven"},
            ],
        });
        let err = serializer.deserialize(&json, scene, None).unwrap_err();
        assert_eq!(err.path.to_string(), "Scene.children[1].r");
        assert!(matches!(err.kind, DeserializeErrorKind::KindMismatch { .. }));
    }

    #[test]
    fn forced_discriminator_round_trips() {
        let (serializer, point) = point_serializer();
        serializer.set_polymorphism(Polymorphism::Forced);

        let instance = {
            let types = serializer.types().read();
            types.construct(point, None).unwrap()
        };
        let json = serializer
            .serialize(&TypedValue::new(point, instance))
            .unwrap();
        assert_eq!(json, json!({"@class": "Point", "x": 0, "y": 0}));

        let back = serializer.deserialize(&json, point, None).unwrap();
        let Variant::Object(back) = back.value else {
            panic!("expected an instance");
        };
        assert_eq!(back.class(), point);
    }

    #[test]
    fn custom_converters_outrank_builtins() {
        struct Celsius;

        impl Converter for Celsius {
            fn can_convert(
                &self,
                types: &TypeRegistry,
                ty: MetaTypeId,
            ) -> bool {
                ty == types.scalar(ScalarKind::Float)
            }

            fn json_kinds(&self) -> crate::JsonKinds {
                crate::JsonKind::String.into()
            }

            fn priority(&self) -> i32 {
                crate::converter::priority::HIGH
            }

            fn serialize(
                &self,
                _ty: MetaTypeId,
                value: &Variant,
                _helper: &dyn crate::ConvertHelper,
            ) -> Result<Value, SerializeError> {
                match value {
                    Variant::Float(degrees) => Ok(Value::String(format!("{degrees}C"))),
                    _ => Err(SerializeError::message("expected a float")),
                }
            }

            fn deserialize(
                &self,
                _ty: MetaTypeId,
                json: &Value,
                _owner: Option<&ObjectRef>,
                _helper: &dyn crate::ConvertHelper,
            ) -> Result<Variant, DeserializeError> {
                let text = json.as_str().unwrap_or_default();
                let degrees = text
                    .strip_suffix('C')
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| DeserializeError::message("expected `<degrees>C`"))?;
                Ok(Variant::Float(degrees))
            }
        }

        let types = TypeRegistryArc::default();
        let float = types.read().scalar(ScalarKind::Float);
        let serializer = JsonSerializer::new(types);
        serializer.add_converter(Celsius);

        let value = TypedValue::new(float, Variant::Float(21.5));
        let json = serializer.serialize(&value).unwrap();
        assert_eq!(json, json!("21.5C"));
        assert_eq!(serializer.deserialize(&json, float, None).unwrap(), value);
    }
}
