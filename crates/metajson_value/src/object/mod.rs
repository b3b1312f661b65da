//! Shared object instances with owner/child parenting.
//!
//! ## Menu
//!
//! - [`Object`]: Property storage for one class instance.
//! - [`ObjectRef`]: Shared, lockable handle to an [`Object`].
//!
//! Instances are created through the registry's factory
//! ([`TypeRegistry::construct`]), which default-initializes every property
//! of the inheritance chain and attaches the instance to its owner before
//! anything else touches it.
//!
//! [`TypeRegistry::construct`]: crate::TypeRegistry::construct

// -----------------------------------------------------------------------------
// Modules

mod instance;

// -----------------------------------------------------------------------------
// Exports

pub use instance::{Object, ObjectRef};
