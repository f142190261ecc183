// Document building for the --field flag
//
// Turns key=value pairs into a JSON object. Dotted keys nest:
// `sensor.id=7` becomes {"sensor": {"id": 7}}. Values that parse as JSON
// literals (numbers, booleans, null, arrays, objects) keep their type;
// anything else is a string.

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

/// Builds a JSON object from `key=value` pairs.
///
/// Later pairs overwrite earlier ones at the same path.
pub fn parse_fields(args: &[String]) -> Result<Value> {
    let mut root = Map::new();

    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid field '{}'. Expected 'key=value'", arg))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("Empty key in field: '{}'", arg));
        }

        insert_path(&mut root, key, parse_value(raw.trim()))?;
    }

    Ok(Value::Object(root))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn insert_path(root: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(anyhow!("Invalid key path '{}': empty segment", key));
    }

    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| anyhow!("Empty key path"))?;

    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(anyhow!(
                    "Cannot nest '{}': '{}' already holds a value",
                    key,
                    segment
                ))
            }
        };
    }

    current.insert(last.to_string(), value);
    Ok(())
}
