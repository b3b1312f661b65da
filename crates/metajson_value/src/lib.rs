#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Modules

mod variant;

pub mod hash;
pub mod info;
pub mod object;
pub mod registry;
pub mod reserved;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use info::MetaTypeId;
pub use object::{Object, ObjectRef};
pub use registry::{TypeRegistry, TypeRegistryArc};
pub use variant::{TypedValue, Variant};
