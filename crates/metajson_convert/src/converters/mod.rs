//! The built-in converters.
//!
//! ## Menu
//!
//! - [`BoolConverter`] / [`NumberConverter`] / [`StringConverter`]: Scalars,
//!   split by the JSON kind they accept.
//! - [`BytesConverter`]: Byte arrays as base64 strings.
//! - [`ListConverter`] / [`MapConverter`]: Containers, recursing per
//!   element.
//! - [`EnumConverter`]: Numeric or named form, flag sets as `"a|b"`.
//! - [`LocaleConverter`]: Locale tags in compact or verbose form.
//! - [`ObjectConverter`]: Classes, including polymorphism and ownership.
//!
//! All built-ins run at standard priority with disjoint type claims, so
//! their relative order never matters; custom converters outrank them with
//! a higher priority or, at equal priority, by registering later.

// -----------------------------------------------------------------------------
// Modules

mod bytes;
mod enums;
mod list;
mod locale;
mod map;
mod object;
mod scalar;

// -----------------------------------------------------------------------------
// Exports

pub use bytes::BytesConverter;
pub use enums::EnumConverter;
pub use list::ListConverter;
pub use locale::LocaleConverter;
pub use map::MapConverter;
pub use object::ObjectConverter;
pub use scalar::{BoolConverter, NumberConverter, StringConverter};

pub(crate) use object::populate_instance;

use metajson_value::info::MetaTypeId;
use metajson_value::{TypeRegistry, Variant};

use crate::error::{SerializeError, SerializeErrorKind};
use crate::registry::ConverterRegistry;

/// The write-side error for a variant whose kind does not fit the target
/// type at all.
pub(crate) fn invalid_value(
    types: &TypeRegistry,
    ty: MetaTypeId,
    value: &Variant,
) -> SerializeError {
    SerializeError::new(SerializeErrorKind::InvalidValue {
        type_name: types.name_of(ty).unwrap_or_default().into(),
        value_kind: value.kind_name(),
    })
}

/// A JSON number as `i64`, accepting integer-valued floats. `2.0` narrows,
/// `2.5` does not.
pub(crate) fn number_as_i64(number: &serde_json::Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    let float = number.as_f64()?;
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < 9_223_372_036_854_775_808.0 {
        return Some(float as i64);
    }
    None
}

/// A JSON number as `u64`, accepting integer-valued floats.
pub(crate) fn number_as_u64(number: &serde_json::Number) -> Option<u64> {
    if let Some(value) = number.as_u64() {
        return Some(value);
    }
    let float = number.as_f64()?;
    // `u64::MAX as f64` rounds up to 2^64, so the upper bound is exclusive.
    if float.fract() == 0.0 && float >= 0.0 && float < 18_446_744_073_709_551_616.0 {
        return Some(float as u64);
    }
    None
}

/// Registers every built-in converter.
pub(crate) fn register_builtins(registry: &mut ConverterRegistry) {
    registry.add(BoolConverter);
    registry.add(NumberConverter);
    registry.add(StringConverter);
    registry.add(BytesConverter);
    registry.add(ListConverter);
    registry.add(MapConverter);
    registry.add(EnumConverter);
    registry.add(LocaleConverter);
    registry.add(ObjectConverter);
}
