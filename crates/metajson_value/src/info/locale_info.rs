use crate::info::MetaTypeId;

// -----------------------------------------------------------------------------
// LocaleInfo

/// Metadata for the built-in locale-tag type.
///
/// Locale values are stored as underscore-form tags (`en_US`, `C`) in a
/// [`Variant::Str`]; the conversion layer decides between compact and
/// verbose text forms.
///
/// [`Variant::Str`]: crate::Variant::Str
#[derive(Debug, Clone)]
pub struct LocaleInfo {
    id: MetaTypeId,
    name: Box<str>,
}

impl LocaleInfo {
    pub(crate) fn new(id: MetaTypeId) -> Self {
        Self {
            id,
            name: "locale".into(),
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
}
