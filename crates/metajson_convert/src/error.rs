use std::borrow::Cow;
use std::{error, fmt};

use metajson_value::info::{MetaTypeId, ScalarKind};
use metajson_value::registry::ConstructError;

use crate::kind::{JsonKind, JsonKinds};

// -----------------------------------------------------------------------------
// ValuePath

/// One step on the way to a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// The top-level value, labeled with its type name.
    Root(Box<str>),
    /// A named member of an object or map.
    Member(Box<str>),
    /// An indexed element of a list.
    Element(usize),
}

/// The location of a value inside the top-level one, rendered like
/// `shape.children[1].r`.
///
/// The conversion driver maintains the path as a stack while recursing;
/// errors are stamped with the deepest path at the point they first
/// surface and keep it on the way up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    /// Create a new empty [`ValuePath`].
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a segment onto the path.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment off the path.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Whether no segment has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The recorded segments, outermost first.
    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.pad("<value>");
        }
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Root(name) => f.write_str(name)?,
                PathSegment::Member(name) => {
                    if index > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Element(element) => write!(f, "[{element}]")?,
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// SerializeError

/// A enumeration of all error outcomes
/// that might happen when serializing a value.
#[derive(Debug)]
pub enum SerializeErrorKind {
    /// The target type id resolves to no registered metadata.
    UnresolvedType { ty: MetaTypeId },
    /// No registered converter claims the target type.
    NoConverter { type_name: Box<str> },
    /// A null value for a type that does not permit it (strict mode).
    NullValue { type_name: Box<str> },
    /// The stored value kind does not fit the target type.
    InvalidValue {
        type_name: Box<str>,
        value_kind: &'static str,
    },
    /// The value's actual class is unrelated to the declared type.
    UnrelatedClass { actual: Box<str>, declared: Box<str> },
    /// Writing the JSON text failed.
    Write(serde_json::Error),
    /// Converter-specific failure.
    Message(Cow<'static, str>),
}

impl fmt::Display for SerializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedType { ty } => {
                write!(f, "type {ty} is not registered")
            }
            Self::NoConverter { type_name } => {
                write!(f, "no converter can serialize type `{type_name}`")
            }
            Self::NullValue { type_name } => {
                write!(f, "null value for type `{type_name}` in strict mode")
            }
            Self::InvalidValue {
                type_name,
                value_kind,
            } => {
                write!(
                    f,
                    "a {value_kind} value cannot be serialized as type `{type_name}`"
                )
            }
            Self::UnrelatedClass { actual, declared } => {
                write!(
                    f,
                    "instance of class `{actual}` is unrelated to declared type `{declared}`"
                )
            }
            Self::Write(err) => write!(f, "failed to write JSON: {err}"),
            Self::Message(message) => f.write_str(message),
        }
    }
}

/// Error produced by serialization, carrying the location of the failing
/// value.
#[derive(Debug)]
pub struct SerializeError {
    pub kind: SerializeErrorKind,
    pub path: ValuePath,
}

impl SerializeError {
    /// Wraps a kind with a still-empty path; the driver stamps the path
    /// where the error first surfaces.
    pub fn new(kind: SerializeErrorKind) -> Self {
        Self {
            kind,
            path: ValuePath::new(),
        }
    }

    /// Converter-specific failure from a plain message.
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(SerializeErrorKind::Message(message.into()))
    }

    // Keeps the deepest stamp; never overwritten on the way up.
    pub(crate) fn stamp(&mut self, path: &ValuePath) {
        if self.path.is_empty() {
            self.path = path.clone();
        }
    }
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            self.kind.fmt(f)
        } else {
            write!(f, "{} (at {})", self.kind, self.path)
        }
    }
}

impl error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            SerializeErrorKind::Write(err) => Some(err),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// DeserializeError

/// A enumeration of all error outcomes
/// that might happen when deserializing a value.
#[derive(Debug)]
pub enum DeserializeErrorKind {
    /// The target type id resolves to no registered metadata.
    UnresolvedType { ty: MetaTypeId },
    /// No registered converter claims the target type at all.
    NoConverter { type_name: Box<str> },
    /// Converters exist for the type, but none accepts the input's JSON
    /// kind. `expected` is the union of the kinds the candidates declared.
    KindMismatch {
        expected: JsonKinds,
        actual: JsonKind,
    },
    /// The `@class` discriminator names no registered class.
    UnknownClass { name: Box<str> },
    /// The discriminator names a class unrelated to the declared type.
    UnrelatedClass { actual: Box<str>, declared: Box<str> },
    /// Forced polymorphism requires a discriminator and none was present.
    MissingDiscriminator { type_name: Box<str> },
    /// JSON `null` for a type that does not permit it (strict mode).
    NullValue { type_name: Box<str> },
    /// A required property is missing from the input object.
    MissingProperty { class: Box<str>, property: Box<str> },
    /// An input key matches no writable property.
    ExtraProperty { class: Box<str>, property: Box<str> },
    /// A string names no item of the enum type.
    UnknownEnumItem {
        enumeration: Box<str>,
        item: Box<str>,
    },
    /// A JSON number does not fit the target scalar.
    InvalidNumber {
        target: ScalarKind,
        number: Box<str>,
    },
    /// Base64 input rejected in validating mode.
    InvalidBase64(base64::DecodeError),
    /// A string is not a well-formed locale tag.
    InvalidLocale { tag: Box<str> },
    /// Instance construction failed.
    Construct(ConstructError),
    /// The input text is not valid JSON.
    Parse(serde_json::Error),
    /// Converter-specific failure.
    Message(Cow<'static, str>),
}

impl fmt::Display for DeserializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedType { ty } => {
                write!(f, "type {ty} is not registered")
            }
            Self::NoConverter { type_name } => {
                write!(f, "no converter can deserialize type `{type_name}`")
            }
            Self::KindMismatch { expected, actual } => {
                write!(f, "expected JSON {expected}, found {actual}")
            }
            Self::UnknownClass { name } => {
                write!(f, "discriminator names unknown class `{name}`")
            }
            Self::UnrelatedClass { actual, declared } => {
                write!(
                    f,
                    "class `{actual}` is unrelated to declared type `{declared}`"
                )
            }
            Self::MissingDiscriminator { type_name } => {
                write!(
                    f,
                    "missing `@class` discriminator for polymorphic type `{type_name}`"
                )
            }
            Self::NullValue { type_name } => {
                write!(f, "JSON null for type `{type_name}` in strict mode")
            }
            Self::MissingProperty { class, property } => {
                write!(f, "missing property `{property}` of class `{class}`")
            }
            Self::ExtraProperty { class, property } => {
                write!(
                    f,
                    "key `{property}` matches no writable property of class `{class}`"
                )
            }
            Self::UnknownEnumItem { enumeration, item } => {
                write!(f, "`{item}` names no item of enum `{enumeration}`")
            }
            Self::InvalidNumber { target, number } => {
                write!(f, "number {number} does not fit scalar type `{target}`")
            }
            Self::InvalidBase64(err) => write!(f, "invalid base64: {err}"),
            Self::InvalidLocale { tag } => {
                write!(f, "`{tag}` is not a well-formed locale tag")
            }
            Self::Construct(err) => err.fmt(f),
            Self::Parse(err) => write!(f, "failed to parse JSON: {err}"),
            Self::Message(message) => f.write_str(message),
        }
    }
}

impl From<ConstructError> for DeserializeErrorKind {
    #[inline]
    fn from(value: ConstructError) -> Self {
        Self::Construct(value)
    }
}

/// Error produced by deserialization, carrying the location of the failing
/// value.
#[derive(Debug)]
pub struct DeserializeError {
    pub kind: DeserializeErrorKind,
    pub path: ValuePath,
}

impl DeserializeError {
    /// Wraps a kind with a still-empty path; the driver stamps the path
    /// where the error first surfaces.
    pub fn new(kind: impl Into<DeserializeErrorKind>) -> Self {
        Self {
            kind: kind.into(),
            path: ValuePath::new(),
        }
    }

    /// Converter-specific failure from a plain message.
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(DeserializeErrorKind::Message(message.into()))
    }

    // Keeps the deepest stamp; never overwritten on the way up.
    pub(crate) fn stamp(&mut self, path: &ValuePath) {
        if self.path.is_empty() {
            self.path = path.clone();
        }
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            self.kind.fmt(f)
        } else {
            write!(f, "{} (at {})", self.kind, self.path)
        }
    }
}

impl error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            DeserializeErrorKind::InvalidBase64(err) => Some(err),
            DeserializeErrorKind::Construct(err) => Some(err),
            DeserializeErrorKind::Parse(err) => Some(err),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
