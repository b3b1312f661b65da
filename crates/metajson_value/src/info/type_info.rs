use std::fmt;
use std::num::NonZeroU32;

use crate::info::{ClassInfo, EnumInfo, ListInfo};
use crate::info::{LocaleInfo, MapInfo, ScalarInfo};

// -----------------------------------------------------------------------------
// MetaTypeId

/// Handle identifying a registered type.
///
/// Ids are handed out by [`TypeRegistry`] registration in order, starting at
/// `1`, and stay valid for the registry's whole lifetime (types are never
/// removed). An id is only meaningful together with the registry that issued
/// it.
///
/// [`TypeRegistry`]: crate::TypeRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaTypeId(NonZeroU32);

impl MetaTypeId {
    /// Builds the id for an arena index.
    ///
    /// The arena is dense and indexed from zero, so `index + 1` never wraps
    /// before the registry itself runs out of memory.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        match NonZeroU32::new(index as u32 + 1) {
            Some(id) => Self(id),
            None => unreachable!(),
        }
    }

    /// The arena index behind this id.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    /// The raw numeric value, `>= 1`.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for MetaTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// An enumeration of the "kinds" of a registered type.
///
/// Each kind corresponds to one [`TypeInfo`] variant and decides which
/// built-in converter family handles values of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    List,
    Map,
    Enum,
    Class,
    Locale,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.pad("Scalar"),
            Self::List => f.pad("List"),
            Self::Map => f.pad("Map"),
            Self::Enum => f.pad("Enum"),
            Self::Class => f.pad("Class"),
            Self::Locale => f.pad("Locale"),
        }
    }
}

/// Error returned when a [`TypeInfo`] value is not the expected [`TypeKind`].
#[derive(Debug)]
pub struct TypeKindError {
    pub expected: TypeKind,
    pub received: TypeKind,
}

impl fmt::Display for TypeKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type kind mismatch: expected {}, received {}",
            self.expected, self.received
        )
    }
}

impl std::error::Error for TypeKindError {}

// -----------------------------------------------------------------------------
// TypeInfo

/// Metadata for one registered type.
///
/// A `TypeInfo` is created once during registration and never changes
/// afterwards; every conversion observing the same id sees the same
/// metadata.
///
/// Use the `as_*` methods to reach the kind-specific info structs.
///
/// # Examples
///
/// ```
/// use metajson_value::TypeRegistry;
/// use metajson_value::info::{ScalarKind, TypeKind};
///
/// let registry = TypeRegistry::new();
/// let id = registry.scalar(ScalarKind::Bool);
/// let info = registry.get(id).unwrap();
///
/// assert_eq!(info.kind(), TypeKind::Scalar);
/// assert_eq!(info.name(), "bool");
/// assert!(info.as_class().is_err());
/// ```
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Scalar(ScalarInfo),
    List(ListInfo),
    Map(MapInfo),
    Enum(EnumInfo),
    Class(ClassInfo),
    Locale(LocaleInfo),
}

// Helper macro that implements type-safe accessor methods like `as_class`.
macro_rules! impl_cast_method {
    ($name:ident : $kind:ident => $info:ident) => {
        /// Convert [`TypeInfo`] to specific type information.
        pub const fn $name(&self) -> Result<&$info, TypeKindError> {
            match self {
                Self::$kind(info) => Ok(info),
                _ => Err(TypeKindError {
                    expected: TypeKind::$kind,
                    received: self.kind(),
                }),
            }
        }
    };
}

impl TypeInfo {
    impl_cast_method!(as_scalar: Scalar => ScalarInfo);
    impl_cast_method!(as_list: List => ListInfo);
    impl_cast_method!(as_map: Map => MapInfo);
    impl_cast_method!(as_enum: Enum => EnumInfo);
    impl_cast_method!(as_class: Class => ClassInfo);
    impl_cast_method!(as_locale: Locale => LocaleInfo);

    /// Returns the [`TypeKind`] for this `TypeInfo` (a fast discriminator).
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::List(_) => TypeKind::List,
            Self::Map(_) => TypeKind::Map,
            Self::Enum(_) => TypeKind::Enum,
            Self::Class(_) => TypeKind::Class,
            Self::Locale(_) => TypeKind::Locale,
        }
    }

    /// The id this info was registered under.
    pub const fn id(&self) -> MetaTypeId {
        match self {
            Self::Scalar(info) => info.id(),
            Self::List(info) => info.id(),
            Self::Map(info) => info.id(),
            Self::Enum(info) => info.id(),
            Self::Class(info) => info.id(),
            Self::Locale(info) => info.id(),
        }
    }

    /// The unique registered name.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(info) => info.name(),
            Self::List(info) => info.name(),
            Self::Map(info) => info.name(),
            Self::Enum(info) => info.name(),
            Self::Class(info) => info.name(),
            Self::Locale(info) => info.name(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_index() {
        let id = MetaTypeId::from_index(0);
        assert_eq!(id.get(), 1);
        assert_eq!(id.index(), 0);

        let id = MetaTypeId::from_index(41);
        assert_eq!(id.get(), 42);
        assert_eq!(id.index(), 41);
        assert_eq!(id.to_string(), "#42");
    }

    #[test]
    fn kind_error_names_both_sides() {
        let err = TypeKindError {
            expected: TypeKind::Class,
            received: TypeKind::Scalar,
        };
        assert_eq!(
            err.to_string(),
            "type kind mismatch: expected Class, received Scalar"
        );
    }
}
