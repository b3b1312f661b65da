use crate::info::MetaTypeId;

// -----------------------------------------------------------------------------
// ListInfo

/// Metadata for a homogeneous list type.
///
/// List types are registered on demand through
/// [`TypeRegistry::register_list`] and memoized by their synthesized name
/// (`list<element>`), so registering the same element type twice yields the
/// same id.
///
/// [`TypeRegistry::register_list`]: crate::TypeRegistry::register_list
#[derive(Debug, Clone)]
pub struct ListInfo {
    id: MetaTypeId,
    name: Box<str>,
    element: MetaTypeId,
}

impl ListInfo {
    pub(crate) fn new(id: MetaTypeId, name: Box<str>, element: MetaTypeId) -> Self {
        Self { id, name, element }
    }

    /// The id this info was registered under.
    #[inline]
    pub const fn id(&self) -> MetaTypeId {
        self.id
    }

    /// The synthesized name, `list<element>`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element type.
    #[inline]
    pub const fn element(&self) -> MetaTypeId {
        self.element
    }
}

// -----------------------------------------------------------------------------
// MapInfo

/// Metadata for a homogeneous string-keyed map type.
///
/// Keys are always strings; only the value type varies. Registered on demand
/// through [`TypeRegistry::register_map`] and memoized like lists.
///
/// [`TypeRegistry::register_map`]: crate::TypeRegistry::register_map
#[derive(Debug, Clone)]
pub struct MapInfo {
    id: MetaTypeId,
    name: Box<str>,
    value: MetaTypeId,
}

impl MapInfo {
    pub(crate) fn new(id: MetaTypeId, name: Box<str>, value: MetaTypeId) -> Self {
        Self { id, name, value }
    }

    /// The id this info was registered under.
    #[inline]
    pub const fn id(&self) -> MetaTypeId {
        self.id
    }

    /// The synthesized name, `map<value>`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value type.
    #[inline]
    pub const fn value_type(&self) -> MetaTypeId {
        self.value
    }
}
