//! Type registration, metadata queries, and the instance factory.
//!
//! ## Menu
//!
//! - [`TypeRegistry`]: Append-only store for [`TypeInfo`]s, seeded with the
//!   built-in scalar and locale types.
//! - [`TypeRegistryArc`]: Shared handle for concurrent readers.
//! - Definitions consumed by registration:
//!     - [`ClassDef`] / [`PropertyDef`]: Class shape, base link, properties.
//!     - [`EnumDef`]: Named items, optionally a flag set.
//! - Errors:
//!     - [`RegistryError`]: Definition rejected during registration.
//!     - [`ConstructError`]: Instance factory failure.
//!
//! Registration validates everything up front (names, property types, base
//! links), so queries over registered metadata never have to re-validate.
//!
//! [`TypeInfo`]: crate::info::TypeInfo

// -----------------------------------------------------------------------------
// Modules

mod define;
mod error;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use define::{ClassDef, EnumDef, PropertyDef};
pub use error::{ConstructError, RegistryError};
pub use type_registry::{TypeRegistry, TypeRegistryArc};
