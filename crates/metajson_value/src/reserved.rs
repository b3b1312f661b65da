//! Names reserved for the conversion engine.
//!
//! Keys starting with [`RESERVED_PREFIX`] never collide with user data:
//! registration rejects any type or property name carrying the prefix, so
//! the engine can claim the whole namespace for itself.

/// Key carrying the polymorphic type discriminator in JSON objects.
pub const CLASS_KEY: &str = "@class";

/// Name of the object-name label property on reference classes.
pub const OBJECT_NAME_KEY: &str = "@name";

/// Documented marker for the per-instance polymorphism override.
///
/// The override itself is stored out-of-band on the instance
/// ([`Object::set_polymorphism_override`]), not as a property; the key is
/// reserved so a future in-band representation stays available.
///
/// [`Object::set_polymorphism_override`]: crate::Object::set_polymorphism_override
pub const POLYMORPHIC_KEY: &str = "@polymorphic";

/// Prefix claiming a name for the engine.
pub const RESERVED_PREFIX: char = '@';

/// Whether the given type or property name is reserved.
#[inline]
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_reserved() {
        assert!(is_reserved("@class"));
        assert!(is_reserved("@anything"));
        assert!(!is_reserved("class"));
        assert!(!is_reserved("name@"));
        assert!(!is_reserved(""));
    }
}
