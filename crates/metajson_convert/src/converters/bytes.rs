use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use metajson_value::info::{MetaTypeId, ScalarKind, TypeInfo};
use metajson_value::{ObjectRef, TypeRegistry, Variant};
use serde_json::Value;

use crate::converter::{ConvertHelper, Converter};
use crate::converters::invalid_value;
use crate::error::{DeserializeError, DeserializeErrorKind, SerializeError};
use crate::kind::JsonKinds;

// Strict decoding requires canonical padding and alphabet; surplus trailing
// bits in the last symbol are tolerated.
const STRICT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

// Permissive decoding never fails; input is pre-filtered to the alphabet.
const PERMISSIVE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Built-in converter for the `bytes` scalar type, written as base64 text.
///
/// Reading honors [`Config::validate_base64`]: when set, malformed input is
/// an [`InvalidBase64`] error; when cleared, characters outside the base64
/// alphabet are discarded and whatever remains decodes best-effort.
///
/// [`Config::validate_base64`]: crate::Config::validate_base64
/// [`InvalidBase64`]: DeserializeErrorKind::InvalidBase64
pub struct BytesConverter;

fn decode_permissive(input: &str) -> Vec<u8> {
    let mut filtered: Vec<u8> = input
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/'))
        .collect();
    // A single leftover symbol encodes fewer than eight bits and cannot
    // contribute a byte.
    if filtered.len() % 4 == 1 {
        filtered.pop();
    }
    PERMISSIVE.decode(&filtered).unwrap_or_default()
}

impl Converter for BytesConverter {
    fn can_convert(&self, types: &TypeRegistry, ty: MetaTypeId) -> bool {
        matches!(
            types.get(ty),
            Some(TypeInfo::Scalar(info)) if info.scalar_kind() == ScalarKind::Bytes
        )
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
        match value {
            Variant::Bytes(bytes) => Ok(Value::String(STRICT.encode(bytes))),
            other => Err(invalid_value(helper.types(), ty, other)),
        }
    }

    fn deserialize(
        &self,
        _ty: MetaTypeId,
        json: &Value,
        _owner: Option<&ObjectRef>,
        helper: &dyn ConvertHelper,
    ) -> Result<Variant, DeserializeError> {
        let Value::String(text) = json else {
            return Err(DeserializeError::message("expected a JSON string"));
        };

        if helper.config().validate_base64 {
            match STRICT.decode(text) {
                Ok(bytes) => Ok(Variant::Bytes(bytes)),
                Err(err) => Err(DeserializeError::new(DeserializeErrorKind::InvalidBase64(
                    err,
                ))),
            }
        } else {
            Ok(Variant::Bytes(decode_permissive(text)))
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
