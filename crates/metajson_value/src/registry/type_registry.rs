use std::collections::BTreeMap;

use crate::hash::{HashMap, HashSet};
use crate::info::{ClassInfo, EnumInfo, EnumItem, ListInfo, LocaleInfo, MapInfo};
use crate::info::{MetaTypeId, ObjectKind, Property, ScalarInfo, ScalarKind, TypeInfo};
use crate::object::{Object, ObjectRef};
use crate::registry::{ClassDef, ConstructError, EnumDef, RegistryError};
use crate::reserved;
use crate::variant::Variant;

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store for type metadata.
///
/// A new registry already contains the built-in scalar types (`bool`,
/// `int`, `uint`, `float`, `string`, `bytes`) and the `locale` tag type;
/// everything else is added through [`register_class`], [`register_enum`],
/// [`register_list`] and [`register_map`].
///
/// The store is append-only: ids stay valid forever and the metadata behind
/// an id never changes. Registration validates definitions up front, so
/// queries never re-validate.
///
/// The registry doubles as the instance factory: [`construct`] builds
/// default-initialized instances of registered classes and wires them into
/// an owner graph.
///
/// # Example
///
/// ```
/// use metajson_value::TypeRegistry;
/// use metajson_value::registry::ClassDef;
///
/// let mut registry = TypeRegistry::new();
/// let int = registry.resolve_name("int").unwrap();
///
/// let point = registry
///     .register_class(ClassDef::value("Point").property("x", int).property("y", int))
///     .unwrap();
///
/// let instance = registry.construct(point, None).unwrap();
/// assert_eq!(instance.property("x"), Some(metajson_value::Variant::Int(0)));
/// ```
///
/// [`register_class`]: Self::register_class
/// [`register_enum`]: Self::register_enum
/// [`register_list`]: Self::register_list
/// [`register_map`]: Self::register_map
/// [`construct`]: Self::construct
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    name_index: HashMap<Box<str>, MetaTypeId>,
    scalars: [MetaTypeId; 6],
    locale: MetaTypeId,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a type registry seeded with the built-in types.
    pub fn new() -> Self {
        let placeholder = MetaTypeId::from_index(0);
        let mut registry = Self {
            types: Vec::new(),
            name_index: HashMap::default(),
            scalars: [placeholder; 6],
            locale: placeholder,
        };
        for (index, kind) in ScalarKind::ALL.into_iter().enumerate() {
            registry.scalars[index] =
                registry.push(|id| TypeInfo::Scalar(ScalarInfo::new(id, kind)));
        }
        registry.locale = registry.push(|id| TypeInfo::Locale(LocaleInfo::new(id)));
        registry
    }

    // # Validity
    // The info's name must **not** already exist in the index.
    fn push(&mut self, info_for: impl FnOnce(MetaTypeId) -> TypeInfo) -> MetaTypeId {
        let id = MetaTypeId::from_index(self.types.len());
        let info = info_for(id);
        self.name_index.insert(info.name().into(), id);
        self.types.push(info);
        id
    }

    fn check_new_name(&self, name: &str) -> Result<(), RegistryError> {
        if reserved::is_reserved(name) {
            return Err(RegistryError::ReservedName { name: name.into() });
        }
        if self.name_index.contains_key(name) {
            return Err(RegistryError::DuplicateName { name: name.into() });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Registers a class type from its definition.
    ///
    /// Validates the name, the base link (must be a registered class of the
    /// same [`ObjectKind`]), every property type, and property-name
    /// uniqueness across the whole inheritance chain.
    ///
    /// Reference classes without a base implicitly declare the object-name
    /// label property (`@name`); derived classes inherit it.
    pub fn register_class(&mut self, def: ClassDef) -> Result<MetaTypeId, RegistryError> {
        self.check_new_name(&def.name)?;

        if let Some(base) = def.base {
            let info = self
                .get(base)
                .ok_or(RegistryError::UnknownType { id: base })?;
            let base_class = info.as_class().map_err(|err| RegistryError::BaseNotClass {
                base,
                kind: err.received,
            })?;
            if base_class.object_kind() != def.object_kind {
                return Err(RegistryError::MixedObjectKind {
                    class: def.name.clone(),
                    base: base_class.name().into(),
                });
            }
        }

        let mut seen: HashSet<&str> = def
            .base
            .map(|base| {
                self.chain_properties(base)
                    .into_iter()
                    .map(Property::name)
                    .collect()
            })
            .unwrap_or_default();

        let mut properties = Vec::with_capacity(def.properties.len() + 1);
        if def.base.is_none() && def.object_kind == ObjectKind::Reference {
            properties.push(Property::new(
                reserved::OBJECT_NAME_KEY.into(),
                self.scalar(ScalarKind::Str),
                true,
                true,
                true,
            ));
        }

        for property in &def.properties {
            if reserved::is_reserved(&property.name) {
                return Err(RegistryError::ReservedName {
                    name: property.name.clone(),
                });
            }
            if !self.contains(property.ty) {
                return Err(RegistryError::UnknownType { id: property.ty });
            }
            if !seen.insert(&property.name) {
                return Err(RegistryError::DuplicateProperty {
                    class: def.name.clone(),
                    property: property.name.clone(),
                });
            }
            properties.push(Property::new(
                property.name.clone(),
                property.ty,
                property.readable,
                property.writable,
                false,
            ));
        }

        // `seen` borrows the base chain out of `self`.
        drop(seen);

        Ok(self.push(|id| {
            TypeInfo::Class(ClassInfo::new(
                id,
                def.name,
                def.object_kind,
                def.base,
                def.polymorphic,
                def.is_abstract,
                properties,
            ))
        }))
    }

    /// Registers an enum type from its definition.
    pub fn register_enum(&mut self, def: EnumDef) -> Result<MetaTypeId, RegistryError> {
        self.check_new_name(&def.name)?;

        let mut seen: HashSet<&str> = HashSet::default();
        for (name, _) in &def.items {
            if reserved::is_reserved(name) {
                return Err(RegistryError::ReservedName { name: name.clone() });
            }
            if !seen.insert(name) {
                return Err(RegistryError::DuplicateEnumItem {
                    enumeration: def.name.clone(),
                    item: name.clone(),
                });
            }
        }

        // `seen` borrows the item names about to be moved.
        drop(seen);

        let items = def
            .items
            .into_iter()
            .map(|(name, value)| EnumItem::new(name, value))
            .collect();
        Ok(self.push(|id| TypeInfo::Enum(EnumInfo::new(id, def.name, items, def.is_flags))))
    }

    /// Registers (or finds) the list type over the given element type.
    ///
    /// List types are memoized by their synthesized name `list<element>`;
    /// registering the same element type twice returns the same id.
    pub fn register_list(&mut self, element: MetaTypeId) -> Result<MetaTypeId, RegistryError> {
        let element_name = self
            .name_of(element)
            .ok_or(RegistryError::UnknownType { id: element })?;
        let name = format!("list<{element_name}>");

        if let Some(&existing) = self.name_index.get(name.as_str()) {
            return match &self.types[existing.index()] {
                TypeInfo::List(info) if info.element() == element => Ok(existing),
                _ => Err(RegistryError::DuplicateName { name: name.into() }),
            };
        }
        Ok(self.push(|id| TypeInfo::List(ListInfo::new(id, name.into(), element))))
    }

    /// Registers (or finds) the string-keyed map type over the given value type.
    ///
    /// Memoized by the synthesized name `map<value>`, like lists.
    pub fn register_map(&mut self, value: MetaTypeId) -> Result<MetaTypeId, RegistryError> {
        let value_name = self
            .name_of(value)
            .ok_or(RegistryError::UnknownType { id: value })?;
        let name = format!("map<{value_name}>");

        if let Some(&existing) = self.name_index.get(name.as_str()) {
            return match &self.types[existing.index()] {
                TypeInfo::Map(info) if info.value_type() == value => Ok(existing),
                _ => Err(RegistryError::DuplicateName { name: name.into() }),
            };
        }
        Ok(self.push(|id| TypeInfo::Map(MapInfo::new(id, name.into(), value))))
    }

    // -------------------------------------------------------------------------
    // Queries

    /// Returns the [`TypeInfo`] registered under the given id.
    #[inline]
    pub fn get(&self, id: MetaTypeId) -> Option<&TypeInfo> {
        self.types.get(id.index())
    }

    /// Whether the given id refers to a registered type.
    #[inline]
    pub fn contains(&self, id: MetaTypeId) -> bool {
        id.index() < self.types.len()
    }

    /// Resolves a unique type name to its id.
    pub fn resolve_name(&self, name: &str) -> Option<MetaTypeId> {
        self.name_index.get(name).copied()
    }

    /// Returns the registered name for the given id.
    pub fn name_of(&self, id: MetaTypeId) -> Option<&str> {
        self.get(id).map(TypeInfo::name)
    }

    /// The id of the built-in scalar type of the given kind.
    #[inline]
    pub fn scalar(&self, kind: ScalarKind) -> MetaTypeId {
        self.scalars[kind as usize]
    }

    /// The id of the built-in locale-tag type.
    #[inline]
    pub const fn locale_type(&self) -> MetaTypeId {
        self.locale
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns an iterator over all registered [`TypeInfo`]s.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeInfo> {
        self.types.iter()
    }

    // -------------------------------------------------------------------------
    // Class chain queries

    /// The inheritance chain of a class, **root-first**.
    ///
    /// Returns an empty vector when the id is not a registered class.
    pub fn class_chain(&self, id: MetaTypeId) -> Vec<&ClassInfo> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(Ok(class)) = self.get(current).map(TypeInfo::as_class) else {
                break;
            };
            cursor = class.base();
            chain.push(class);
        }
        chain.reverse();
        chain
    }

    /// All properties of a class including inherited ones, root-first in
    /// declaration order.
    pub fn chain_properties(&self, id: MetaTypeId) -> Vec<&Property> {
        self.class_chain(id)
            .into_iter()
            .flat_map(ClassInfo::properties)
            .collect()
    }

    /// Finds a property by name anywhere in the inheritance chain.
    pub fn find_property(&self, id: MetaTypeId, name: &str) -> Option<&Property> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let class = self.get(current)?.as_class().ok()?;
            if let Some(property) = class.property(name) {
                return Some(property);
            }
            cursor = class.base();
        }
        None
    }

    /// Whether `id` is `ancestor` itself or one of its descendants.
    pub fn is_same_or_descendant(&self, id: MetaTypeId, ancestor: MetaTypeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = match self.get(current).map(TypeInfo::as_class) {
                Some(Ok(class)) => class.base(),
                _ => None,
            };
        }
        false
    }

    /// Whether any class in the inheritance chain opted into polymorphism.
    pub fn polymorphic_in_chain(&self, id: MetaTypeId) -> bool {
        self.class_chain(id)
            .iter()
            .any(|class| class.is_polymorphic())
    }

    // -------------------------------------------------------------------------
    // Instance factory

    /// Constructs a default-initialized instance of a class.
    ///
    /// Every property of the inheritance chain is set to its type's
    /// [`default_value`](Self::default_value). With an `owner`, the new
    /// instance is attached as a child first; owner attachment must precede
    /// initialization.
    pub fn construct(
        &self,
        id: MetaTypeId,
        owner: Option<&ObjectRef>,
    ) -> Result<ObjectRef, ConstructError> {
        let info = self.get(id).ok_or(ConstructError::UnknownType { id })?;
        let class = info.as_class().map_err(|err| ConstructError::NotAClass {
            id,
            kind: err.received,
        })?;
        if class.is_abstract() {
            return Err(ConstructError::AbstractClass {
                name: class.name().into(),
            });
        }

        let instance = ObjectRef::new(Object::new(id));
        if let Some(owner) = owner {
            owner.attach_child(&instance);
        }

        let mut object = instance.write();
        for property in self.chain_properties(id) {
            object.set_property(property.name(), self.default_value(property.ty())?);
        }
        drop(object);

        Ok(instance)
    }

    /// The default value for a registered type.
    ///
    /// Scalars default to `false` / `0` / `0.0` / `""` / empty bytes,
    /// containers to empty, enums to their first declared item (or `0`),
    /// locales to `"C"`. Reference classes default to [`Variant::Null`],
    /// value classes to a default-constructed instance.
    pub fn default_value(&self, id: MetaTypeId) -> Result<Variant, ConstructError> {
        let info = self.get(id).ok_or(ConstructError::UnknownType { id })?;
        Ok(match info {
            TypeInfo::Scalar(scalar) => match scalar.scalar_kind() {
                ScalarKind::Bool => Variant::Bool(false),
                ScalarKind::Int => Variant::Int(0),
                ScalarKind::UInt => Variant::UInt(0),
                ScalarKind::Float => Variant::Float(0.0),
                ScalarKind::Str => Variant::Str(String::new()),
                ScalarKind::Bytes => Variant::Bytes(Vec::new()),
            },
            TypeInfo::List(_) => Variant::List(Vec::new()),
            TypeInfo::Map(_) => Variant::Map(BTreeMap::new()),
            TypeInfo::Enum(info) => Variant::Int(info.items().first().map_or(0, EnumItem::value)),
            TypeInfo::Locale(_) => Variant::Str("C".into()),
            // Value-class recursion terminates: a property's type is always
            // registered strictly before the class declaring the property.
            TypeInfo::Class(class) => match class.object_kind() {
                ObjectKind::Reference => Variant::Null,
                ObjectKind::Value => Variant::Object(self.construct(id, None)?),
            },
        })
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

use std::sync::{Arc, PoisonError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to a [`TypeRegistry`].
///
/// Registration happens through [`write`](Self::write) during setup;
/// steady-state conversion only ever takes [`read`](Self::read) guards, so
/// concurrent conversions never block each other.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    /// Wraps an already-populated registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.read().name_index.keys().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::TypeKind;

    #[test]
    fn seeds_builtin_types() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), 7);

        for kind in ScalarKind::ALL {
            let id = registry.scalar(kind);
            let info = registry.get(id).unwrap();
            assert_eq!(info.name(), kind.type_name());
            assert_eq!(info.kind(), TypeKind::Scalar);
            assert_eq!(registry.resolve_name(kind.type_name()), Some(id));
        }
        assert_eq!(registry.resolve_name("locale"), Some(registry.locale_type()));
    }

    #[test]
    fn rejects_duplicate_and_reserved_names() {
        let mut registry = TypeRegistry::new();
        assert!(matches!(
            registry.register_enum(EnumDef::new("bool")),
            Err(RegistryError::DuplicateName { .. })
        ));
        assert!(matches!(
            registry.register_class(ClassDef::value("@thing")),
            Err(RegistryError::ReservedName { .. })
        ));

        let int = registry.scalar(ScalarKind::Int);
        assert!(matches!(
            registry.register_class(ClassDef::value("Widget").property("@class", int)),
            Err(RegistryError::ReservedName { .. })
        ));
    }

    #[test]
    fn validates_base_links() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);

        assert!(matches!(
            registry.register_class(ClassDef::reference("Broken").base(int)),
            Err(RegistryError::BaseNotClass { .. })
        ));

        let gadget = registry.register_class(ClassDef::value("Gadget")).unwrap();
        assert!(matches!(
            registry.register_class(ClassDef::reference("Mixed").base(gadget)),
            Err(RegistryError::MixedObjectKind { .. })
        ));
    }

    #[test]
    fn rejects_property_shadowing_across_chain() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);

        let base = registry
            .register_class(ClassDef::value("Base").property("a", int))
            .unwrap();
        let err = registry
            .register_class(ClassDef::value("Derived").base(base).property("a", int))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateProperty { .. }));
    }

    #[test]
    fn rejects_duplicate_enum_items() {
        let mut registry = TypeRegistry::new();

        let err = registry
            .register_enum(EnumDef::new("Mode").item("idle", 0).item("idle", 1))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateEnumItem { .. }));

        assert!(matches!(
            registry.register_enum(EnumDef::new("Tag").item("@class", 0)),
            Err(RegistryError::ReservedName { .. })
        ));
    }

    #[test]
    fn reference_root_declares_object_name() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);

        let base = registry
            .register_class(ClassDef::reference("Node").property("weight", int))
            .unwrap();
        let derived = registry
            .register_class(ClassDef::reference("Leaf").base(base))
            .unwrap();

        let label = registry.find_property(base, "@name").unwrap();
        assert!(label.is_object_name());
        assert_eq!(label.ty(), registry.scalar(ScalarKind::Str));

        // Inherited, not re-declared.
        let derived_class = registry.get(derived).unwrap().as_class().unwrap();
        assert!(derived_class.property("@name").is_none());
        assert!(registry.find_property(derived, "@name").is_some());

        // Value classes carry no label.
        let gadget = registry.register_class(ClassDef::value("Gadget")).unwrap();
        assert!(registry.find_property(gadget, "@name").is_none());
    }

    #[test]
    fn memoizes_container_types() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);

        let a = registry.register_list(int).unwrap();
        let b = registry.register_list(int).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.name_of(a), Some("list<int>"));

        let nested = registry.register_list(a).unwrap();
        assert_eq!(registry.name_of(nested), Some("list<list<int>>"));

        let map = registry.register_map(int).unwrap();
        assert_eq!(registry.name_of(map), Some("map<int>"));
        assert_ne!(map, a);
    }

    #[test]
    fn chain_queries_are_root_first() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);

        let shape = registry
            .register_class(ClassDef::value("Shape").property("id", int))
            .unwrap();
        let circle = registry
            .register_class(ClassDef::value("Circle").base(shape).property("r", int))
            .unwrap();

        let chain = registry.class_chain(circle);
        let names: Vec<_> = chain.iter().map(|class| class.name()).collect();
        assert_eq!(names, ["Shape", "Circle"]);

        let properties: Vec<_> = registry
            .chain_properties(circle)
            .into_iter()
            .map(Property::name)
            .collect();
        assert_eq!(properties, ["id", "r"]);

        assert!(registry.is_same_or_descendant(circle, shape));
        assert!(registry.is_same_or_descendant(shape, shape));
        assert!(!registry.is_same_or_descendant(shape, circle));

        assert!(registry.find_property(circle, "id").is_some());
        assert!(registry.find_property(shape, "r").is_none());
    }

    #[test]
    fn polymorphic_flag_spans_the_chain() {
        let mut registry = TypeRegistry::new();

        let shape = registry
            .register_class(ClassDef::value("Shape").polymorphic())
            .unwrap();
        let circle = registry
            .register_class(ClassDef::value("Circle").base(shape))
            .unwrap();
        let plain = registry.register_class(ClassDef::value("Plain")).unwrap();

        assert!(registry.polymorphic_in_chain(shape));
        assert!(registry.polymorphic_in_chain(circle));
        assert!(!registry.polymorphic_in_chain(plain));
    }

    #[test]
    fn construct_default_initializes_the_chain() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);
        let string = registry.scalar(ScalarKind::Str);

        let base = registry
            .register_class(ClassDef::value("Base").property("id", int))
            .unwrap();
        let derived = registry
            .register_class(
                ClassDef::value("Derived")
                    .base(base)
                    .property("label", string),
            )
            .unwrap();

        let instance = registry.construct(derived, None).unwrap();
        assert_eq!(instance.class(), derived);
        assert_eq!(instance.property("id"), Some(Variant::Int(0)));
        assert_eq!(instance.property("label"), Some(Variant::Str(String::new())));
    }

    #[test]
    fn construct_attaches_to_owner() {
        let mut registry = TypeRegistry::new();

        let node = registry.register_class(ClassDef::reference("Node")).unwrap();
        let owner = registry.construct(node, None).unwrap();
        let child = registry.construct(node, Some(&owner)).unwrap();

        assert!(child.parent().is_some_and(|p| p.ptr_eq(&owner)));
        assert!(owner.read().children()[0].ptr_eq(&child));
        // The label property defaults along with everything else.
        assert_eq!(child.property("@name"), Some(Variant::Str(String::new())));
    }

    #[test]
    fn construct_refuses_abstract_and_non_class() {
        let mut registry = TypeRegistry::new();
        let int = registry.scalar(ScalarKind::Int);

        let shape = registry
            .register_class(ClassDef::value("Shape").abstract_class())
            .unwrap();
        assert!(matches!(
            registry.construct(shape, None),
            Err(ConstructError::AbstractClass { .. })
        ));
        assert!(matches!(
            registry.construct(int, None),
            Err(ConstructError::NotAClass { .. })
        ));
    }

    #[test]
    fn default_values_by_kind() {
        let mut registry = TypeRegistry::new();

        let bool_id = registry.scalar(ScalarKind::Bool);
        assert_eq!(registry.default_value(bool_id).unwrap(), Variant::Bool(false));

        let mode = registry
            .register_enum(EnumDef::new("Mode").item("idle", 3).item("busy", 4))
            .unwrap();
        assert_eq!(registry.default_value(mode).unwrap(), Variant::Int(3));

        assert_eq!(
            registry.default_value(registry.locale_type()).unwrap(),
            Variant::Str("C".into())
        );

        let node = registry.register_class(ClassDef::reference("Node")).unwrap();
        assert_eq!(registry.default_value(node).unwrap(), Variant::Null);

        let point = registry.register_class(ClassDef::value("Point")).unwrap();
        match registry.default_value(point) {
            Ok(Variant::Object(instance)) => assert_eq!(instance.class(), point),
            other => panic!("expected default instance, got {other:?}"),
        }
    }
}
