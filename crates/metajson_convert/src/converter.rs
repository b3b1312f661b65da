use metajson_value::{ObjectRef, TypeRegistry, Variant};
use metajson_value::info::MetaTypeId;
use serde_json::Value;

use crate::config::Config;
use crate::error::{DeserializeError, PathSegment, SerializeError};
use crate::kind::JsonKinds;

// -----------------------------------------------------------------------------
// Priority

/// Named rungs for [`Converter::priority`].
///
/// Equal priorities are resolved by registration order: the converter
/// registered later wins, so an application can always override a built-in
/// by registering a replacement at the same rung.
pub mod priority {
    pub const EXTREME_LOW: i32 = -0x00FF_FFFF;
    pub const VERY_LOW: i32 = -0x0000_FFFF;
    pub const LOW: i32 = -0x0000_00FF;
    pub const STANDARD: i32 = 0;
    pub const HIGH: i32 = 0x0000_00FF;
    pub const VERY_HIGH: i32 = 0x0000_FFFF;
    pub const EXTREME_HIGH: i32 = 0x00FF_FFFF;
}

// -----------------------------------------------------------------------------
// Converter

/// One pluggable conversion strategy.
///
/// The dispatch engine consults converters in priority order and calls the
/// selected one exactly once per value; a failure aborts the whole
/// top-level operation, no other converter gets a second chance.
///
/// # Contract
///
/// - [`can_convert`](Self::can_convert) must return `true` only if the
///   converter handles **every** valid instance of the type, and its
///   answer must be stable for a given registry state.
/// - [`json_kinds`](Self::json_kinds) declares the JSON shapes accepted on
///   deserialization. A converter must handle every combination of
///   declared kind and claimed type; when only certain combinations are
///   valid, split the converter.
/// - Nested values are converted through the [`ConvertHelper`], never by
///   calling other converters directly, so recursion keeps the engine's
///   dispatch, configuration, and error paths.
/// - [`priority`](Self::priority) is read once at registration; later
///   changes are not observed by the engine.
pub trait Converter: Send + Sync {
    /// Whether this converter handles all values of the given type.
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool;

    /// The JSON shapes accepted on deserialization.
    fn json_kinds(&self) -> JsonKinds;

    /// Selection priority; higher wins. See [`priority`] for the named rungs.
    fn priority(&self) -> i32 {
        priority::STANDARD
    }

    /// Serializes a value of a claimed type into a JSON tree.
    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError>;

    /// Deserializes a JSON value of a declared kind into a value of a
    /// claimed type.
    ///
    /// `owner` is the object the result will belong to, if any; converters
    /// pass it through to nested conversions so constructed instances
    /// parent correctly.
    fn deserialize(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError>;
}

// -----------------------------------------------------------------------------
// ConvertHelper

/// The engine surface handed to converters for recursion.
///
/// The helper carries the per-call state: the registry guards, the
/// configuration snapshot, and the path of the value currently being
/// converted. The `hint` passed to the subtype methods extends that path
/// for the duration of the nested conversion, which is how errors learn
/// locations like `shape.children[1].r`.
pub trait ConvertHelper {
    /// The type metadata for this call.
    fn types(&self) -> &TypeRegistry;

    /// The configuration snapshot for this call.
    fn config(&self) -> &Config;

    /// Serializes a nested value through the engine.
    fn serialize_subtype(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        hint: PathSegment,
    ) -> Result<Value, SerializeError>;

    /// Deserializes a nested value through the engine.
    fn deserialize_subtype(
        &self,
        ty: MetaTypeId,
        json: &Value,
        owner: Option<&ObjectRef>,
        hint: PathSegment,
    ) -> Result<Variant, DeserializeError>;
}
