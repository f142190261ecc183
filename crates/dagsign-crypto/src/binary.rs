// Binary encoding of signable values
//
// Regular mode signs the canonical JSON bytes directly. DataUpdate mode wraps
// them as `PREFIX + len(base64) + "\n" + base64` before hashing.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EncodingError, Result};
use crate::jcs::canonicalize_bytes;
use crate::types::CONSTELLATION_PREFIX;

/// Converts a value to the bytes that get hashed for signing.
///
/// # Arguments
/// * `value` - Any serializable value
/// * `is_data_update` - Apply the DataUpdate wrapping
pub fn to_bytes<T: Serialize + ?Sized>(value: &T, is_data_update: bool) -> Result<Vec<u8>> {
    let utf8_bytes = canonicalize_bytes(value)?;
    if !is_data_update {
        return Ok(utf8_bytes);
    }

    let encoded = BASE64_STANDARD.encode(&utf8_bytes);
    let wrapped = format!("{}{}\n{}", CONSTELLATION_PREFIX, encoded.len(), encoded);
    Ok(wrapped.into_bytes())
}

/// Shorthand for `to_bytes(value, true)`.
pub fn encode_data_update<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    to_bytes(value, true)
}

/// Decodes DataUpdate bytes back into the value they wrap.
///
/// Fails if the prefix is missing, the length line is absent or not an
/// integer, the declared length disagrees with the payload, or the payload
/// is not base64-encoded UTF-8 JSON.
pub fn decode_data_update<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let text = String::from_utf8(bytes.to_vec()).map_err(EncodingError::from)?;

    let rest = text
        .strip_prefix(CONSTELLATION_PREFIX)
        .ok_or(EncodingError::MissingPrefix)?;

    let (length_field, payload) = rest
        .split_once('\n')
        .ok_or(EncodingError::MissingLengthDelimiter)?;

    let declared: usize = length_field
        .parse()
        .map_err(|_| EncodingError::InvalidLength(length_field.to_string()))?;

    let actual = payload.chars().count();
    if declared != actual {
        return Err(EncodingError::LengthMismatch { declared, actual }.into());
    }

    let json_bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(EncodingError::from)?;
    let json = String::from_utf8(json_bytes).map_err(EncodingError::from)?;

    Ok(serde_json::from_str(&json).map_err(EncodingError::from)?)
}
