use std::fmt;

use crate::info::MetaTypeId;

// -----------------------------------------------------------------------------
// ScalarKind

/// The primitive shapes a [`ScalarInfo`] type can take.
///
/// One registered built-in type exists per kind; [`TypeRegistry::scalar`]
/// resolves the id.
///
/// [`TypeRegistry::scalar`]: crate::TypeRegistry::scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Bytes,
}

impl ScalarKind {
    /// All kinds, in registration order.
    pub const ALL: [ScalarKind; 6] = [
        Self::Bool,
        Self::Int,
        Self::UInt,
        Self::Float,
        Self::Str,
        Self::Bytes,
    ];

    /// The registered type name for this kind.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Str => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.type_name())
    }
}

// -----------------------------------------------------------------------------
// ScalarInfo

/// Metadata for a primitive built-in type.
#[derive(Debug, Clone)]
pub struct ScalarInfo {
    id: MetaTypeId,
    name: Box<str>,
    scalar: ScalarKind,
}

impl ScalarInfo {
    pub(crate) fn new(id: MetaTypeId, scalar: ScalarKind) -> Self {
        Self {
            id,
            name: scalar.type_name().into(),
            scalar,
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

    /// Which primitive shape values of this type take.
    #[inline]
    pub const fn scalar_kind(&self) -> ScalarKind {
        self.scalar
    }
}
