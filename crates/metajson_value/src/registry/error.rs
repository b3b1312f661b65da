use std::{error, fmt};

use crate::info::{MetaTypeId, TypeKind};

// -----------------------------------------------------------------------------
// RegistryError

/// A enumeration of all error outcomes of type registration.
///
/// Registration is all-or-nothing: a rejected definition leaves the
/// registry untouched.
#[derive(Debug)]
pub enum RegistryError {
    /// Another type with the same name already exists.
    DuplicateName { name: Box<str> },
    /// The type or property name starts with the reserved `@` prefix.
    ReservedName { name: Box<str> },
    /// A referenced type id is not registered.
    UnknownType { id: MetaTypeId },
    /// The base id does not refer to a class.
    BaseNotClass { base: MetaTypeId, kind: TypeKind },
    /// The class and its base disagree on reference/value kind.
    MixedObjectKind { class: Box<str>, base: Box<str> },
    /// The property name already exists on the class or one of its bases.
    DuplicateProperty { class: Box<str>, property: Box<str> },
    /// The enum item name is declared twice.
    DuplicateEnumItem { enumeration: Box<str>, item: Box<str> },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => {
                write!(f, "a type named `{name}` is already registered")
            }
            Self::ReservedName { name } => {
                write!(f, "name `{name}` uses the reserved `@` prefix")
            }
            Self::UnknownType { id } => {
                write!(f, "referenced type {id} is not registered")
            }
            Self::BaseNotClass { base, kind } => {
                write!(f, "base type {base} is a {kind}, not a class")
            }
            Self::MixedObjectKind { class, base } => {
                write!(
                    f,
                    "class `{class}` and base `{base}` disagree on reference/value kind"
                )
            }
            Self::DuplicateProperty { class, property } => {
                write!(
                    f,
                    "property `{property}` already exists in the chain of class `{class}`"
                )
            }
            Self::DuplicateEnumItem { enumeration, item } => {
                write!(f, "enum `{enumeration}` declares item `{item}` twice")
            }
        }
    }
}

impl error::Error for RegistryError {}

// -----------------------------------------------------------------------------
// ConstructError

/// A enumeration of all error outcomes of the instance factory.
#[derive(Debug)]
pub enum ConstructError {
    /// The requested type id is not registered.
    UnknownType { id: MetaTypeId },
    /// The requested type is not a class.
    NotAClass { id: MetaTypeId, kind: TypeKind },
    /// The class is abstract and cannot be instantiated.
    AbstractClass { name: Box<str> },
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { id } => {
                write!(f, "cannot construct unregistered type {id}")
            }
            Self::NotAClass { id, kind } => {
                write!(f, "cannot construct type {id}: it is a {kind}, not a class")
            }
            Self::AbstractClass { name } => {
                write!(f, "cannot construct abstract class `{name}`")
            }
        }
    }
}

impl error::Error for ConstructError {}
