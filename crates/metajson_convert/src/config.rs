use std::fmt;

use bitflags::bitflags;

// -----------------------------------------------------------------------------
// Polymorphism

/// How object conversion treats the `@class` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polymorphism {
    /// Never write the discriminator, ignore it on input.
    Disabled,
    /// Follow class metadata and per-instance overrides; accept an optional
    /// discriminator on input.
    #[default]
    Enabled,
    /// Always write the discriminator and require it on input.
    Forced,
}

// -----------------------------------------------------------------------------
// LocaleEncoding

/// The text form locale tags serialize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocaleEncoding {
    /// Hyphenated BCP 47 style tags (`en-US`).
    Compact,
    /// Underscore form (`en_US`).
    #[default]
    Verbose,
}

// -----------------------------------------------------------------------------
// ValidationFlags

bitflags! {
    /// Strictness switches for object deserialization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ValidationFlags: u8 {
        /// Reject JSON keys that match no writable property.
        const NO_EXTRA_PROPERTIES = 1 << 0;
        /// Require every writable property to be present in the input.
        const ALL_PROPERTIES = 1 << 1;
        /// Both checks at once.
        const FULL = Self::NO_EXTRA_PROPERTIES.bits() | Self::ALL_PROPERTIES.bits();
    }
}

// -----------------------------------------------------------------------------
// JsonFormat

/// The text layout used by the byte and stream entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// No insignificant whitespace.
    #[default]
    Compact,
    /// Indented, human-readable output.
    Pretty,
}

// -----------------------------------------------------------------------------
// Config

/// The configuration observed by one conversion call.
///
/// The serializer facade snapshots its current `Config` when a call starts;
/// setter changes made while a conversion runs only affect later calls.
///
/// The defaults are conservative: strict nulls, numeric enums, validated
/// base64, no object-name round-trip, metadata-driven polymorphism, and no
/// extra validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Replace JSON `null` with the target type's default value instead of
    /// failing, for types whose converters do not accept null themselves.
    /// Also permits serializing null values of non-nullable types.
    pub allow_default_null: bool,
    /// Serialize the object-name label property and keep it in output.
    /// Stored labels are always honored on input.
    pub keep_object_name: bool,
    /// Write enums as item names (flag sets as `"a|b"`) instead of numbers.
    pub enum_as_string: bool,
    /// Reject base64 input with invalid characters instead of filtering
    /// them out.
    pub validate_base64: bool,
    /// Text form for locale tags.
    pub locale_encoding: LocaleEncoding,
    /// Strictness switches for object deserialization.
    pub validation: ValidationFlags,
    /// Discriminator handling for object conversion.
    pub polymorphism: Polymorphism,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_default_null: false,
            keep_object_name: false,
            enum_as_string: false,
            validate_base64: true,
            locale_encoding: LocaleEncoding::Verbose,
            validation: ValidationFlags::empty(),
            polymorphism: Polymorphism::Enabled,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allow_default_null={} keep_object_name={} enum_as_string={} \
             validate_base64={} locale_encoding={:?} validation={:?} polymorphism={:?}",
            self.allow_default_null,
            self.keep_object_name,
            self.enum_as_string,
            self.validate_base64,
            self.locale_encoding,
            self.validation,
            self.polymorphism,
        )
    }
}

// -----------------------------------------------------------------------------
// Tests
