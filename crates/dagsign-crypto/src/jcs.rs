// JCS (JSON Canonicalization Scheme) - RFC 8785 implementation
//
// Objects are emitted here so their members can be ordered by UTF-16 code
// units. Scalars are rendered by serde_jcs.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::{EncodingError, Result};

/// Largest integer magnitude an IEEE-754 double holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Canonicalizes a serializable value according to RFC 8785 (JCS).
///
/// - Object keys are sorted by UTF-16 code units
/// - No insignificant whitespace
/// - Numbers use the shortest round-trippable ECMAScript form
///
/// Fails with `EncodingError::Canonicalization` when the value has no JSON
/// representation (for example a map with non-string keys), or holds an
/// integer outside +/-(2^53 - 1).
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value =
        serde_json::to_value(value).map_err(|e| EncodingError::Canonicalization(e.to_string()))?;

    let mut out = String::new();
    write_value(&value, &mut out)?;
    Ok(out)
}

/// Canonicalizes a value and returns the UTF-8 bytes of the canonical JSON.
pub fn canonicalize_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(canonicalize(value)?.into_bytes())
}

fn write_value(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> = map.iter().collect();
            members.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            out.push('{');
            for (i, (key, item)) in members.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&scalar(key)?);
                out.push(':');
                write_value(item, out)?;
            }
            out.push('}');
        }
        Value::Number(n) => {
            check_integer_range(n)?;
            out.push_str(&scalar(n)?);
        }
        other => out.push_str(&scalar(other)?),
    }
    Ok(())
}

fn scalar<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_jcs::to_string(value).map_err(|e| EncodingError::Canonicalization(e.to_string()).into())
}

fn check_integer_range(n: &Number) -> Result<()> {
    let magnitude = match (n.as_i64(), n.as_u64()) {
        (Some(i), _) => i.unsigned_abs(),
        (None, Some(u)) => u,
        _ => return Ok(()),
    };
    if magnitude > MAX_SAFE_INTEGER {
        return Err(EncodingError::Canonicalization(format!(
            "integer {} is outside the exactly representable range",
            n
        ))
        .into());
    }
    Ok(())
}
