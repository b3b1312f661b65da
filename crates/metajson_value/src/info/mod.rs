//! Runtime type metadata.
//!
//! ## Menu
//!
//! - [`MetaTypeId`]: Handle identifying a registered type.
//! - [`TypeInfo`]: Enumeration over the per-kind info structs.
//! - [`TypeKind`]: Fast discriminator for [`TypeInfo`].
//! - Per-kind info:
//!     - [`ScalarInfo`]: Primitive values ([`ScalarKind`]).
//!     - [`ListInfo`] / [`MapInfo`]: Homogeneous containers.
//!     - [`EnumInfo`]: Named integer items, optionally a flag set.
//!     - [`ClassInfo`]: Named typed [`Property`]s plus base-class link.
//!     - [`LocaleInfo`]: Opaque locale tag.
//!
//! All info structs are built by the [registry](crate::registry) during
//! registration and are read-only afterwards, so metadata read back out is
//! always internally consistent.

// -----------------------------------------------------------------------------
// Modules

mod class_info;
mod container_info;
mod enum_info;
mod locale_info;
mod scalar_info;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use class_info::{ClassInfo, ObjectKind, Property};
pub use container_info::{ListInfo, MapInfo};
pub use enum_info::{EnumInfo, EnumItem};
pub use locale_info::LocaleInfo;
pub use scalar_info::{ScalarInfo, ScalarKind};
pub use type_info::{MetaTypeId, TypeInfo, TypeKind, TypeKindError};
