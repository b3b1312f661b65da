use metajson_value::info::{MetaTypeId, TypeInfo};
use metajson_value::{ObjectRef, TypeRegistry, Variant};
use serde_json::Value;

use crate::config::LocaleEncoding;
use crate::converter::{ConvertHelper, Converter};
use crate::converters::invalid_value;
use crate::error::{DeserializeError, DeserializeErrorKind, SerializeError};
use crate::kind::JsonKinds;

/// Built-in converter for the `locale` type.
///
/// Locales are stored in underscore form (`de_DE`). Writing follows
/// [`Config::locale_encoding`]: `Verbose` emits the stored form, `Compact`
/// the hyphenated BCP 47 style (`de-DE`). Reading accepts either separator
/// and normalizes to underscores; the anonymous `C` locale reads from `"C"`,
/// `"c"` or the empty string.
///
/// [`Config::locale_encoding`]: crate::Config::locale_encoding
pub struct LocaleConverter;

fn normalize(tag: &str) -> Option<String> {
    if tag.is_empty() || tag == "C" || tag == "c" {
        return Some("C".to_owned());
    }

    let normalized = tag.replace('-', "_");
    let well_formed = normalized.split('_').all(|segment| {
        (1..=8).contains(&segment.len()) && segment.bytes().all(|b| b.is_ascii_alphanumeric())
    });
    well_formed.then_some(normalized)
}

impl Converter for LocaleConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        matches!(types.get(ty), Some(TypeInfo::Locale(_)))
    }

    fn json_kinds(&self) -> JsonKinds {
        JsonKinds::STRING
    }

    fn serialize(
        &self,
        ty: MetaTypeId,
        value: &Variant,
        helper: &dyn ConvertHelper,
    ) -> Result<Value, SerializeError> {
        let Variant::Str(tag) = value else {
            return Err(invalid_value(helper.types(), ty, value));
        };
        let text = match helper.config().locale_encoding {
            LocaleEncoding::Verbose => tag.clone(),
            LocaleEncoding::Compact => tag.replace('_', "-"),
        };
        Ok(Value::String(text))
    }

    fn deserialize(
        &self,
        _ty: MetaTypeId,
        json: &Value,
        _owner: Option<&ObjectRef>,
        _helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let Value::String(text) = json else {
            return Err(DeserializeError::message("expected a JSON string"));
        };
        match normalize(text) {
            Some(tag) => Ok(Variant::Str(tag)),
            None => Err(DeserializeError::new(DeserializeErrorKind::InvalidLocale {
                tag: text.as_str().into(),
            })),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::Config;
    use crate::driver::ConvertDriver;
    use crate::registry::ConverterRegistry;

    fn driver_with(encoding: LocaleEncoding) -> (TypeRegistry, ConverterRegistry, Config) {
        let config = Config {
            locale_encoding: encoding,
            ..Config::default()
        };
        (TypeRegistry::new(), ConverterRegistry::with_builtins(), config)
    }

    #[test]
    fn verbose_writes_the_stored_form() {
        let (types, converters, config) = driver_with(LocaleEncoding::Verbose);
        let driver = ConvertDriver::new(&types, &converters, config);

        let locale = types.locale_type();
        let json = driver
            .serialize_root(locale, &Variant::Str("de_DE".into()))
            .unwrap();
        assert_eq!(json, json!("de_DE"));
    }

    #[test]
    fn compact_writes_hyphens() {
        let (types, converters, config) = driver_with(LocaleEncoding::Compact);
        let driver = ConvertDriver::new(&types, &converters, config);

        let locale = types.locale_type();
        let json = driver
            .serialize_root(locale, &Variant::Str("zh_Hans_CN".into()))
            .unwrap();
        assert_eq!(json, json!("zh-Hans-CN"));
    }

    #[test]
    fn read_accepts_either_separator() {
        let (types, converters, config) = driver_with(LocaleEncoding::Verbose);
        let driver = ConvertDriver::new(&types, &converters, config);

        let locale = types.locale_type();
        for form in ["en-US", "en_US"] {
            assert_eq!(
                driver.deserialize_root(locale, &json!(form), None).unwrap(),
                Variant::Str("en_US".into())
            );
        }
    }

    #[test]
    fn anonymous_locale_forms() {
        let (types, converters, config) = driver_with(LocaleEncoding::Verbose);
        let driver = ConvertDriver::new(&types, &converters, config);

        let locale = types.locale_type();
        for form in ["C", "c", ""] {
            assert_eq!(
                driver.deserialize_root(locale, &json!(form), None).unwrap(),
                Variant::Str("C".into())
            );
        }
    }

    #[test]
    fn malformed_tags_are_rejected() {
        let (types, converters, config) = driver_with(LocaleEncoding::Verbose);
        let driver = ConvertDriver::new(&types, &converters, config);

        let locale = types.locale_type();
        for bad in ["de!DE", "de__DE", "waytoolongsegment", "en_"] {
            let err = driver
                .deserialize_root(locale, &json!(bad), None)
                .unwrap_err();
            assert!(
                matches!(err.kind, DeserializeErrorKind::InvalidLocale { .. }),
                "`{bad}` should be rejected"
            );
        }
    }
}
