use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// A store record: field name → JSON value.
pub type Record = Map<String, Value>;

/// Convert a JSON value into a [`Record`].
///
/// Fails with [`StoreError::NotARecord`] unless `value` is an object.
pub fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotARecord {
            found: kind_of(&other),
        }),
    }
}

/// Serialize any `Serialize` value into a [`Record`].
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> Result<Record> {
    into_record(serde_json::to_value(value)?)
}

/// Deserialize a [`Record`] into a typed value.
pub fn from_record<T: DeserializeOwned>(record: &Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record.clone()))?)
}

/// Shallow merge: every field in `partial` replaces the field in `base`
/// wholesale; fields absent from `partial` keep their value.
pub fn shallow_merge(base: &Record, partial: Record) -> Record {
    let mut next = base.clone();
    for (key, value) in partial {
        next.insert(key, value);
    }
    next
}

/// Read one field, `Value::Null` when missing.
pub fn field(record: &Record, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

/// Read a field that is itself expected to hold a record.
///
/// Missing or non-object fields read as an empty record.
pub(crate) fn field_record(record: &Record, key: &str) -> Record {
    match record.get(key) {
        Some(Value::Object(map)) => map.clone(),
        _ => Record::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
