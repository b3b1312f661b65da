use std::collections::BTreeMap;
use std::fmt;

use crate::info::MetaTypeId;
use crate::object::ObjectRef;

// -----------------------------------------------------------------------------
// Variant

/// The tagged value union moved through conversion.
///
/// A `Variant` is untyped on its own: the same `Variant::Int(3)` may back an
/// `int` property, a `uint` property, or an enum. Pairing it with the
/// [`MetaTypeId`] it should be interpreted as gives a [`TypedValue`].
///
/// Map keys are strings and iterate in key order, so anything derived from a
/// map (JSON output included) is deterministic.
///
/// Equality is structural. Object values compare by content (class plus
/// properties), with a pointer-equality shortcut for shared instances; see
/// [`ObjectRef`] for the details.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Variant {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Variant>),
    Map(BTreeMap<String, Variant>),
    Object(ObjectRef),
}

macro_rules! impl_variant_accessor {
    ($name:ident : $kind:ident => $ty:ty) => {
        /// Returns the inner value if this variant is of the matching kind.
        #[inline]
        pub const fn $name(&self) -> Option<&$ty> {
            match self {
                Self::$kind(value) => Some(value),
                _ => None,
            }
        }
    };
}

impl Variant {
    impl_variant_accessor!(as_bool: Bool => bool);
    impl_variant_accessor!(as_int: Int => i64);
    impl_variant_accessor!(as_uint: UInt => u64);
    impl_variant_accessor!(as_float: Float => f64);
    impl_variant_accessor!(as_str: Str => String);
    impl_variant_accessor!(as_bytes: Bytes => Vec<u8>);
    impl_variant_accessor!(as_list: List => Vec<Variant>);
    impl_variant_accessor!(as_map: Map => BTreeMap<String, Variant>);
    impl_variant_accessor!(as_object: Object => ObjectRef);

    /// Whether this variant is [`Variant::Null`].
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short name for the stored kind, for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Variant {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<ObjectRef> for Variant {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

// -----------------------------------------------------------------------------
// TypedValue

/// A [`Variant`] paired with the [`MetaTypeId`] it should be interpreted as.
///
/// This is the unit the serializer facade speaks: the target type decides
/// which converter owns the value, the variant carries the data.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub ty: MetaTypeId,
    pub value: Variant,
}

impl TypedValue {
    /// Pair a value with its target type.
    #[inline]
    pub fn new(ty: MetaTypeId, value: impl Into<Variant>) -> Self {
        Self {
            ty,
            value: value.into(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} value of type {}", self.value.kind_name(), self.ty)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_kind() {
        let value = Variant::Int(7);
        assert_eq!(value.as_int(), Some(&7));
        assert_eq!(value.as_uint(), None);
        assert_eq!(value.kind_name(), "int");
        assert!(!value.is_null());
        assert!(Variant::Null.is_null());
    }

    #[test]
    fn structural_equality() {
        let a = Variant::List(vec![Variant::Int(1), Variant::Str("x".into())]);
        let b = Variant::List(vec![Variant::Int(1), Variant::Str("x".into())]);
        assert_eq!(a, b);

        let mut left = BTreeMap::new();
        left.insert("k".to_owned(), Variant::Bool(true));
        let mut right = BTreeMap::new();
        right.insert("k".to_owned(), Variant::Bool(false));
        assert_ne!(Variant::Map(left), Variant::Map(right));
    }

    #[test]
    fn default_is_null() {
        assert_eq!(Variant::default(), Variant::Null);
    }
}
