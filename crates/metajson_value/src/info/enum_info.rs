use crate::hash::HashMap;
use crate::info::MetaTypeId;

// -----------------------------------------------------------------------------
// EnumItem

/// One named value of an enum type.
#[derive(Debug, Clone)]
pub struct EnumItem {
    name: Box<str>,
    value: i64,
}

impl EnumItem {
    pub(crate) fn new(name: Box<str>, value: i64) -> Self {
        Self { name, value }
    }

    /// The item name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The numeric value.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }
}

// -----------------------------------------------------------------------------
// EnumInfo

/// Metadata for an enum type: named integer items, optionally a flag set.
///
/// Flag enums combine items by bitwise OR and render as `"A|B"` strings when
/// string encoding is enabled.
///
/// The order of internal items is fixed, depends on the registration order.
#[derive(Debug, Clone)]
pub struct EnumInfo {
    id: MetaTypeId,
    name: Box<str>,
    items: Box<[EnumItem]>,
    item_index: HashMap<Box<str>, usize>,
    is_flags: bool,
}

impl EnumInfo {
    pub(crate) fn new(
        id: MetaTypeId,
        name: Box<str>,
        items: Vec<EnumItem>,
        is_flags: bool,
    ) -> Self {
        let item_index = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.name.clone(), index))
            .collect();
        Self {
            id,
            name,
            items: items.into(),
            item_index,
            is_flags,
        }
    }

    /// The id this info was registered under.
    #[inline]
    pub const fn id(&self) -> MetaTypeId {
        self.id
    }

    /// The unique registered name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether items combine by bitwise OR.
    #[inline]
    pub const fn is_flags(&self) -> bool {
        self.is_flags
    }

    /// The items in **declaration order**.
    #[inline]
    pub fn items(&self) -> &[EnumItem] {
        &self.items
    }

    /// Returns the [`EnumItem`] for the given `name`, if present.
    pub fn item(&self, name: &str) -> Option<&EnumItem> {
        self.item_index.get(name).map(|index| &self.items[*index])
    }

    /// Returns the first item whose value matches exactly, if any.
    ///
    /// This is O(N) complexity.
    pub fn item_by_value(&self, value: i64) -> Option<&EnumItem> {
        self.items.iter().find(|item| item.value == value)
    }

    /// Returns the number of items.
    #[inline]
    pub fn item_len(&self) -> usize {
        self.items.len()
    }
}

// -----------------------------------------------------------------------------
// Tests
