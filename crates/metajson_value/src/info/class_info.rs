use std::fmt;

use crate::hash::HashMap;
use crate::info::MetaTypeId;

// -----------------------------------------------------------------------------
// ObjectKind

/// How instances of a class live.
///
/// The kind decides null handling and parenting during conversion:
/// reference instances are nullable and parent into an owner graph, value
/// instances behave like plain data and reject null in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Externally managed, parentable, nullable object.
    Reference,
    /// Gadget-like value object.
    Value,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => f.pad("Reference"),
            Self::Value => f.pad("Value"),
        }
    }
}

// -----------------------------------------------------------------------------
// Property

/// One named, typed property of a class.
///
/// Property names are unique across the whole inheritance chain; shadowing a
/// base-class property is a registration error.
#[derive(Debug, Clone)]
pub struct Property {
    name: Box<str>,
    ty: MetaTypeId,
    readable: bool,
    writable: bool,
    is_object_name: bool,
}

impl Property {
    pub(crate) fn new(
        name: Box<str>,
        ty: MetaTypeId,
        readable: bool,
        writable: bool,
        is_object_name: bool,
    ) -> Self {
        Self {
            name,
            ty,
            readable,
            writable,
            is_object_name,
        }
    }

    /// The property name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value type.
    #[inline]
    pub const fn ty(&self) -> MetaTypeId {
        self.ty
    }

    /// Whether the property participates in serialization.
    #[inline]
    pub const fn readable(&self) -> bool {
        self.readable
    }

    /// Whether the property accepts values during deserialization.
    #[inline]
    pub const fn writable(&self) -> bool {
        self.writable
    }

    /// Whether this is the auto-declared object-name label.
    ///
    /// The label only serializes when the configuration asks to keep object
    /// names, and is exempt from the all-properties-required check.
    #[inline]
    pub const fn is_object_name(&self) -> bool {
        self.is_object_name
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// Metadata for a class type: own properties plus the base-class link.
///
/// `ClassInfo` holds the properties declared on the class itself; inherited
/// properties are reached through the registry's chain queries
/// ([`chain_properties`], [`find_property`]).
///
/// [`chain_properties`]: crate::TypeRegistry::chain_properties
/// [`find_property`]: crate::TypeRegistry::find_property
#[derive(Debug, Clone)]
pub struct ClassInfo {
    id: MetaTypeId,
    name: Box<str>,
    object_kind: ObjectKind,
    base: Option<MetaTypeId>,
    polymorphic: bool,
    is_abstract: bool,
    properties: Box<[Property]>,
    property_index: HashMap<Box<str>, usize>,
}

impl ClassInfo {
    pub(crate) fn new(
        id: MetaTypeId,
        name: Box<str>,
        object_kind: ObjectKind,
        base: Option<MetaTypeId>,
        polymorphic: bool,
        is_abstract: bool,
        properties: Vec<Property>,
    ) -> Self {
        let property_index = properties
            .iter()
            .enumerate()
            .map(|(index, property)| (property.name.clone(), index))
            .collect();
        Self {
            id,
            name,
            object_kind,
            base,
            polymorphic,
            is_abstract,
            properties: properties.into(),
            property_index,
        }
    }

    /// The id this info was registered under.
    #[inline]
    pub const fn id(&self) -> MetaTypeId {
        self.id
    }

    /// The unique registered name, also used as the `@class` discriminator.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How instances of this class live.
    #[inline]
    pub const fn object_kind(&self) -> ObjectKind {
        self.object_kind
    }

    /// The direct base class, if any.
    #[inline]
    pub const fn base(&self) -> Option<MetaTypeId> {
        self.base
    }

    /// Whether this class opts its subtree into polymorphic conversion.
    #[inline]
    pub const fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    /// Whether instances can be constructed.
    #[inline]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The properties declared on this class itself, in **declaration order**.
    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the own [`Property`] for the given `name`, if present.
    ///
    /// Inherited properties are not visible here; use
    /// [`TypeRegistry::find_property`](crate::TypeRegistry::find_property)
    /// to search the whole chain.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.property_index
            .get(name)
            .map(|index| &self.properties[*index])
    }

    /// Returns the number of own properties.
    #[inline]
    pub fn property_len(&self) -> usize {
        self.properties.len()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_property_lookup() {
        let ty = MetaTypeId::from_index(1);
        let info = ClassInfo::new(
            MetaTypeId::from_index(7),
            "Point".into(),
            ObjectKind::Value,
            None,
            false,
            false,
            vec![
                Property::new("x".into(), ty, true, true, false),
                Property::new("y".into(), ty, true, true, false),
            ],
        );

        assert_eq!(info.property_len(), 2);
        assert_eq!(info.property("x").map(Property::name), Some("x"));
        assert!(info.property("z").is_none());
        assert_eq!(info.properties()[1].name(), "y");
        assert!(!info.is_abstract());
        assert_eq!(info.object_kind(), ObjectKind::Value);
    }
}
