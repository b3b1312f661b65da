use metajson_value::TypeRegistry;
use metajson_value::info::MetaTypeId;

use crate::converter::Converter;
use crate::kind::{JsonKind, JsonKinds};

// -----------------------------------------------------------------------------
// ConverterRecord

/// One registered converter with its registration-time priority snapshot.
///
/// Snapshotting pins the priority the engine observes; a converter whose
/// `priority()` answer drifts afterwards keeps its original rank.
pub struct ConverterRecord {
    converter: Box<dyn Converter>,
    priority: i32,
}

impl ConverterRecord {
    fn new(converter: Box<dyn Converter>) -> Self {
        let priority = converter.priority();
        Self {
            converter,
            priority,
        }
    }

    /// The registered converter.
    #[inline]
    pub fn converter(&self) -> &dyn Converter {
        &*self.converter
    }

    /// The priority snapshot taken at registration.
    #[inline]
    pub const fn priority(&self) -> i32 {
        self.priority
    }
}

// -----------------------------------------------------------------------------
// Selection failure

// Why deserialization selection produced no converter. The two cases are
// distinct by contract: a kind mismatch proves converters for the type
// exist.
pub(crate) enum SelectFailure {
    NoConverter,
    KindMismatch { expected: JsonKinds },
}

// -----------------------------------------------------------------------------
// ConverterRegistry

/// Append-only store of [`Converter`]s with priority-ordered selection.
///
/// Converters are never removed. Selection picks the highest priority
/// (snapshot at registration); between equal priorities the converter
/// registered later wins.
#[derive(Default)]
pub struct ConverterRegistry {
    records: Vec<ConverterRecord>,
}

impl ConverterRegistry {
    /// Create a new empty [`ConverterRegistry`].
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Create a registry holding the built-in converters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::converters::register_builtins(&mut registry);
        registry
    }

    /// Registers a converter, snapshotting its priority.
    pub fn add<C: Converter + 'static>(&mut self, converter: C) {
        self.add_boxed(Box::new(converter));
    }

    /// Registers an already-boxed converter.
    pub fn add_boxed(&mut self, converter: Box<dyn Converter>) {
        self.records.push(ConverterRecord::new(converter));
    }

    /// Returns the number of registered converters.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no converter has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records in registration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ConverterRecord> {
        self.records.iter()
    }

    /// Picks the converter serializing values of `ty`, if any.
    pub(crate) fn select_serializer(
        &self,
        types: &TypeRegistry,
        ty: MetaTypeId,
    ) -> Option<&ConverterRecord> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.converter.can_convert(types, ty))
            .max_by_key(|(index, record)| (record.priority, *index))
            .map(|(_, record)| record)
    }

    /// Picks the converter deserializing `ty` from an input of `kind`.
    pub(crate) fn select_deserializer(
        &self,
        types: &TypeRegistry,
        ty: MetaTypeId,
        kind: JsonKind,
    ) -> Result<&ConverterRecord, SelectFailure> {
        let mut declared = JsonKinds::empty();
        let mut candidates = false;

        let selected = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.converter.can_convert(types, ty))
            .inspect(|(_, record)| {
                candidates = true;
                declared |= record.converter.json_kinds();
            })
            .filter(|(_, record)| record.converter.json_kinds().contains_kind(kind))
            .max_by_key(|(index, record)| (record.priority, *index));

        match selected {
            Some((_, record)) => Ok(record),
            None if candidates => Err(SelectFailure::KindMismatch { expected: declared }),
            None => Err(SelectFailure::NoConverter),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use metajson_value::Variant;
    use metajson_value::ObjectRef;
    use serde_json::Value;

    use crate::converter::{ConvertHelper, priority};
    use crate::error::{DeserializeError, SerializeError};

    struct Probe {
        label: &'static str,
        priority: i32,
        kinds: JsonKinds,
    }

    impl Converter for Probe {
        fn can_convert(&self, _: &TypeRegistry, _: MetaTypeId) -> bool {
            true
        }

        fn json_kinds(&self) -> JsonKinds {
            self.kinds
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn serialize(
            &self,
            _: MetaTypeId,
            _: &Variant,
            _: &dyn ConvertHelper,
        ) -> Result<Value, SerializeError> {
            Ok(Value::String(self.label.into()))
        }

        fn deserialize(
            &self,
            _: MetaTypeId,
            _: &Value,
            _: Option<&ObjectRef>,
            _: &dyn ConvertHelper,
        ) -> Result<Variant, DeserializeError> {
            Ok(Variant::Str(self.label.into()))
        }
    }

    fn probe(label: &'static str, priority: i32) -> Probe {
        Probe {
            label,
            priority,
            kinds: JsonKinds::STRING,
        }
    }

    #[test]
    fn higher_priority_wins() {
        let types = TypeRegistry::new();
        let ty = types.resolve_name("int").unwrap();

        let mut registry = ConverterRegistry::new();
        registry.add(probe("high", priority::HIGH));
        registry.add(probe("standard", priority::STANDARD));

        let record = registry.select_serializer(&types, ty).unwrap();
        assert_eq!(record.priority(), priority::HIGH);
    }

    #[test]
    fn later_registration_wins_ties() {
        let types = TypeRegistry::new();
        let ty = types.resolve_name("int").unwrap();

        let mut registry = ConverterRegistry::new();
        registry.add(probe("first", priority::STANDARD));
        registry.add(probe("second", priority::STANDARD));

        let record = registry.select_serializer(&types, ty).unwrap();
        let json = record
            .converter()
            .serialize(ty, &Variant::Null, &NoHelper)
            .unwrap();
        assert_eq!(json, Value::String("second".into()));
    }

    #[test]
    fn kind_mismatch_reports_declared_union() {
        let types = TypeRegistry::new();
        let ty = types.resolve_name("int").unwrap();

        let mut registry = ConverterRegistry::new();
        registry.add(Probe {
            label: "strings",
            priority: priority::STANDARD,
            kinds: JsonKinds::STRING,
        });
        registry.add(Probe {
            label: "numbers",
            priority: priority::STANDARD,
            kinds: JsonKinds::NUMBER,
        });

        match registry.select_deserializer(&types, ty, JsonKind::Array) {
            Err(SelectFailure::KindMismatch { expected }) => {
                assert_eq!(expected, JsonKinds::STRING | JsonKinds::NUMBER);
            }
            _ => panic!("expected a kind mismatch"),
        }

        assert!(registry.select_deserializer(&types, ty, JsonKind::Number).is_ok());
    }

    #[test]
    fn empty_registry_has_no_converter() {
        let types = TypeRegistry::new();
        let ty = types.resolve_name("int").unwrap();

        let registry = ConverterRegistry::new();
        assert!(registry.select_serializer(&types, ty).is_none());
        assert!(matches!(
            registry.select_deserializer(&types, ty, JsonKind::Number),
            Err(SelectFailure::NoConverter)
        ));
    }

    struct NoHelper;

    impl ConvertHelper for NoHelper {
        fn types(&self) -> &TypeRegistry {
            unimplemented!("not used by probes")
        }

        fn config(&self) -> &crate::config::Config {
            unimplemented!("not used by probes")
        }

        fn serialize_subtype(
            &self,
            _: MetaTypeId,
            _: &Variant,
            _: crate::error::PathSegment,
        ) -> Result<Value, SerializeError> {
            unimplemented!("not used by probes")
        }

        fn deserialize_subtype(
            &self,
            _: MetaTypeId,
            _: &Value,
            _: Option<&ObjectRef>,
            _: crate::error::PathSegment,
        ) -> Result<Variant, DeserializeError> {
            unimplemented!("not used by probes")
        }
    }
}
