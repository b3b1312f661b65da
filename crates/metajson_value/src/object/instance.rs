use std::fmt;
use std::sync::{Arc, PoisonError, Weak};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hash::HashMap;
use crate::info::MetaTypeId;
use crate::reserved;
use crate::variant::Variant;

// -----------------------------------------------------------------------------
// Object

/// Property storage for one class instance.
///
/// An `Object` remembers the class it was constructed as, its property
/// values, its position in the ownership graph (parent and children), and
/// the optional per-instance polymorphism override.
///
/// Equality compares class and properties only; ownership edges and the
/// override are conversion-control state, not value state.
pub struct Object {
    class: MetaTypeId,
    properties: HashMap<Box<str>, Variant>,
    polymorphism_override: Option<bool>,
    parent: Weak<RwLock<Object>>,
    children: Vec<ObjectRef>,
}

impl Object {
    pub(crate) fn new(class: MetaTypeId) -> Self {
        Self {
            class,
            properties: HashMap::default(),
            polymorphism_override: None,
            parent: Weak::new(),
            children: Vec::new(),
        }
    }

    /// The class this instance was constructed as.
    #[inline]
    pub const fn class(&self) -> MetaTypeId {
        self.class
    }

    /// Returns the stored value for the given property, if present.
    pub fn property(&self, name: &str) -> Option<&Variant> {
        self.properties.get(name)
    }

    /// Stores a property value, replacing any previous one.
    ///
    /// Names are not validated against the class metadata here; the factory
    /// initializes the declared set and the conversion layer only writes
    /// declared properties, so anything else is deliberate caller choice.
    pub fn set_property(&mut self, name: impl Into<Box<str>>, value: Variant) {
        self.properties.insert(name.into(), value);
    }

    /// Iterates over the stored properties in unspecified but fixed order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.properties.iter().map(|(name, value)| (&**name, value))
    }

    /// The object-name label, if this instance carries one.
    pub fn object_name(&self) -> Option<&str> {
        match self.properties.get(reserved::OBJECT_NAME_KEY) {
            Some(Variant::Str(name)) => Some(name),
            _ => None,
        }
    }

    /// Sets the object-name label.
    pub fn set_object_name(&mut self, name: impl Into<String>) {
        self.properties
            .insert(reserved::OBJECT_NAME_KEY.into(), Variant::Str(name.into()));
    }

    /// The per-instance polymorphism override, if set.
    ///
    /// `Some(true)` forces the discriminator for this instance, `Some(false)`
    /// suppresses it; `None` defers to the class metadata. Only consulted
    /// when the configuration leaves polymorphism in its enabled-by-metadata
    /// mode.
    #[inline]
    pub const fn polymorphism_override(&self) -> Option<bool> {
        self.polymorphism_override
    }

    /// Sets or clears the per-instance polymorphism override.
    #[inline]
    pub fn set_polymorphism_override(&mut self, enabled: Option<bool>) {
        self.polymorphism_override = enabled;
    }

    /// The instances owned by this one.
    #[inline]
    pub fn children(&self) -> &[ObjectRef] {
        &self.children
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.properties == other.properties
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Object");
        out.field("class", &self.class);
        for (name, value) in self.properties.iter() {
            out.field(name, value);
        }
        out.finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

/// Shared, lockable handle to an [`Object`].
///
/// Cloning the handle shares the instance. Lock poisoning is ignored: a
/// panic while holding the lock leaves plain data behind, nothing that can
/// violate an invariant worth halting for.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<RwLock<Object>>,
}

impl ObjectRef {
    pub(crate) fn new(object: Object) -> Self {
        Self {
            inner: Arc::new(RwLock::new(object)),
        }
    }

    /// Takes a read lock on the underlying [`Object`].
    pub fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`Object`].
    pub fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles point at the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The class this instance was constructed as.
    #[inline]
    pub fn class(&self) -> MetaTypeId {
        self.read().class
    }

    /// Returns a clone of the stored value for the given property.
    pub fn property(&self, name: &str) -> Option<Variant> {
        self.read().properties.get(name).cloned()
    }

    /// Stores a property value, replacing any previous one.
    pub fn set_property(&self, name: impl Into<Box<str>>, value: Variant) {
        self.write().set_property(name, value);
    }

    /// The owner of this instance, if it is still alive.
    pub fn parent(&self) -> Option<ObjectRef> {
        let parent = self.read().parent.upgrade()?;
        Some(Self { inner: parent })
    }

    /// Attaches `child` to this instance.
    ///
    /// The child keeps a weak link to its parent; the parent keeps the child
    /// alive through its children list. A child attached twice is listed
    /// twice.
    pub fn attach_child(&self, child: &ObjectRef) {
        child.write().parent = Arc::downgrade(&self.inner);
        self.write().children.push(child.clone());
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        *self.read() == *other.read()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests
