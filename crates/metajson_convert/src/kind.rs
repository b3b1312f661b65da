use std::fmt;

use bitflags::bitflags;
use serde_json::Value;

// -----------------------------------------------------------------------------
// JsonKind

/// An enumeration of the shapes a JSON value can take.
///
/// The deserialization dispatcher matches the kind of the input against the
/// [`JsonKinds`] a converter declares, so converters only ever see shapes
/// they asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// The kind of the given JSON value.
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// This kind as a single-bit [`JsonKinds`] set.
    pub const fn as_flag(self) -> JsonKinds {
        match self {
            Self::Null => JsonKinds::NULL,
            Self::Bool => JsonKinds::BOOL,
            Self::Number => JsonKinds::NUMBER,
            Self::String => JsonKinds::STRING,
            Self::Array => JsonKinds::ARRAY,
            Self::Object => JsonKinds::OBJECT,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.pad("null"),
            Self::Bool => f.pad("bool"),
            Self::Number => f.pad("number"),
            Self::String => f.pad("string"),
            Self::Array => f.pad("array"),
            Self::Object => f.pad("object"),
        }
    }
}

// -----------------------------------------------------------------------------
// JsonKinds

bitflags! {
    /// A set of [`JsonKind`]s, declared by converters for deserialization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct JsonKinds: u8 {
        const NULL = 1 << 0;
        const BOOL = 1 << 1;
        const NUMBER = 1 << 2;
        const STRING = 1 << 3;
        const ARRAY = 1 << 4;
        const OBJECT = 1 << 5;
    }
}

impl JsonKinds {
    /// Whether the set contains the given kind.
    #[inline]
    pub const fn contains_kind(self, kind: JsonKind) -> bool {
        self.contains(kind.as_flag())
    }
}

impl From<JsonKind> for JsonKinds {
    fn from(kind: JsonKind) -> Self {
        kind.as_flag()
    }
}

impl fmt::Display for JsonKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.pad("none");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            // Flag names are uppercase; kinds display lowercase.
            f.write_str(&name.to_ascii_lowercase())?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
