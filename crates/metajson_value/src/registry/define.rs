use crate::info::{MetaTypeId, ObjectKind};

// -----------------------------------------------------------------------------
// PropertyDef

/// Definition of one class property, consumed by [`ClassDef`].
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: Box<str>,
    pub ty: MetaTypeId,
    pub readable: bool,
    pub writable: bool,
}

impl PropertyDef {
    /// A normal read-write property.
    pub fn new(name: impl Into<Box<str>>, ty: MetaTypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            readable: true,
            writable: true,
        }
    }

    /// A property that serializes but never accepts input.
    pub fn read_only(name: impl Into<Box<str>>, ty: MetaTypeId) -> Self {
        Self {
            readable: true,
            writable: false,
            ..Self::new(name, ty)
        }
    }

    /// A property that accepts input but never serializes.
    pub fn write_only(name: impl Into<Box<str>>, ty: MetaTypeId) -> Self {
        Self {
            readable: false,
            writable: true,
            ..Self::new(name, ty)
        }
    }
}

// -----------------------------------------------------------------------------
// ClassDef

/// Definition of a class type, consumed by [`TypeRegistry::register_class`].
///
/// # Examples
///
/// ```
/// use metajson_value::TypeRegistry;
/// use metajson_value::registry::ClassDef;
///
/// let mut registry = TypeRegistry::new();
/// let float = registry.resolve_name("float").unwrap();
///
/// let shape = registry
///     .register_class(ClassDef::reference("Shape").polymorphic().abstract_class())
///     .unwrap();
/// let circle = registry
///     .register_class(
///         ClassDef::reference("Circle")
///             .base(shape)
///             .property("r", float),
///     )
///     .unwrap();
///
/// assert!(registry.is_same_or_descendant(circle, shape));
/// ```
///
/// [`TypeRegistry::register_class`]: crate::TypeRegistry::register_class
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub(crate) name: Box<str>,
    pub(crate) object_kind: ObjectKind,
    pub(crate) base: Option<MetaTypeId>,
    pub(crate) polymorphic: bool,
    pub(crate) is_abstract: bool,
    pub(crate) properties: Vec<PropertyDef>,
}

impl ClassDef {
    fn new(name: Box<str>, object_kind: ObjectKind) -> Self {
        Self {
            name,
            object_kind,
            base: None,
            polymorphic: false,
            is_abstract: false,
            properties: Vec::new(),
        }
    }

    /// A reference class: externally managed, parentable, nullable.
    pub fn reference(name: impl Into<Box<str>>) -> Self {
        Self::new(name.into(), ObjectKind::Reference)
    }

    /// A value class: gadget-like plain data.
    pub fn value(name: impl Into<Box<str>>) -> Self {
        Self::new(name.into(), ObjectKind::Value)
    }

    /// Links the class under an already-registered base class.
    ///
    /// The base must have the same [`ObjectKind`].
    pub fn base(mut self, base: MetaTypeId) -> Self {
        self.base = Some(base);
        self
    }

    /// Opts this class and its descendants into polymorphic conversion.
    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }

    /// Marks the class abstract; the factory refuses to instantiate it.
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Adds a normal read-write property.
    pub fn property(self, name: impl Into<Box<str>>, ty: MetaTypeId) -> Self {
        self.property_def(PropertyDef::new(name, ty))
    }

    /// Adds a property from a full [`PropertyDef`].
    pub fn property_def(mut self, def: PropertyDef) -> Self {
        self.properties.push(def);
        self
    }
}

// -----------------------------------------------------------------------------
// EnumDef

/// Definition of an enum type, consumed by [`TypeRegistry::register_enum`].
///
/// # Examples
///
/// ```
/// use metajson_value::TypeRegistry;
/// use metajson_value::registry::EnumDef;
///
/// let mut registry = TypeRegistry::new();
/// let mode = registry
///     .register_enum(
///         EnumDef::flags("OpenMode")
///             .item("read", 1)
///             .item("write", 2),
///     )
///     .unwrap();
///
/// let info = registry.get(mode).unwrap().as_enum().unwrap();
/// assert!(info.is_flags());
/// assert_eq!(info.item("write").unwrap().value(), 2);
/// ```
///
/// [`TypeRegistry::register_enum`]: crate::TypeRegistry::register_enum
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub(crate) name: Box<str>,
    pub(crate) items: Vec<(Box<str>, i64)>,
    pub(crate) is_flags: bool,
}

impl EnumDef {
    /// A plain enum: one item at a time.
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            is_flags: false,
        }
    }

    /// A flag enum: items combine by bitwise OR.
    pub fn flags(name: impl Into<Box<str>>) -> Self {
        Self {
            is_flags: true,
            ..Self::new(name)
        }
    }

    /// Adds a named item.
    pub fn item(mut self, name: impl Into<Box<str>>, value: i64) -> Self {
        self.items.push((name.into(), value));
        self
    }
}
