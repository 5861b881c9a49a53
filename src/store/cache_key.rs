//! Canonical cache keys for query records.
//!
//! Two queries that hold the same present fields map to the same key no
//! matter the field order, and `null` top-level fields count as absent.

use serde_json::{Map, Value};

use crate::types::Record;

/// Deterministic string key for `query`.
///
/// Top-level `null` fields are dropped, object keys are sorted at every
/// depth, and the result is serialized as compact JSON.
pub fn canonical_key(query: &Record) -> String {
    let mut present: Vec<(&String, &Value)> =
        query.iter().filter(|(_, v)| !v.is_null()).collect();
    present.sort_by(|a, b| a.0.cmp(b.0));

    let mut ordered = Map::new();
    for (key, value) in present {
        ordered.insert(key.clone(), sorted(value));
    }
    Value::Object(ordered).to_string()
}

/// Rebuild `value` with object keys inserted in lexicographic order, so the
/// output does not depend on whether serde_json preserves insertion order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
