#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Modules

mod driver;

pub mod config;
pub mod converter;
pub mod converters;
pub mod error;
pub mod kind;
pub mod registry;
pub mod serializer;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use config::{Config, JsonFormat, LocaleEncoding, Polymorphism, ValidationFlags};
pub use converter::{ConvertHelper, Converter, priority};
pub use error::{DeserializeError, DeserializeErrorKind, PathSegment, ValuePath};
pub use error::{SerializeError, SerializeErrorKind};
pub use kind::{JsonKind, JsonKinds};
pub use registry::ConverterRegistry;
pub use serializer::JsonSerializer;

// -----------------------------------------------------------------------------
// Re-export crates

pub use serde_json;
