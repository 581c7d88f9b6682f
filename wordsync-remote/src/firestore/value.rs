//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type
//! (`{"stringValue": "cat"}`, `{"integerValue": "3"}`, ...). Records are kept
//! as plain JSON everywhere else, so conversion happens only at the wire.

use serde_json::{json, Map, Number, Value};
use wordsync_core::Record;

/// Encodes a record as a Firestore `fields` map.
pub fn to_fields(record: &Record) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(name, value)| (name.clone(), to_value(value)))
            .collect(),
    )
}

/// Encodes one JSON value.
pub fn to_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(f64::NAN) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(name, v)| (name.clone(), to_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decodes a Firestore `fields` map into a record.
pub fn from_fields(fields: &Map<String, Value>) -> Record {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), from_value(value)))
        .collect()
}

/// Decodes one typed value. Unknown encodings decode to `null`.
///
/// The decode is lossy for types JSON has no counterpart for: timestamps,
/// bytes and references become strings, geo points become
/// `{latitude, longitude}` objects. Writing such a record back through
/// [`to_value`] stores a `stringValue` or `mapValue`, so the remote field
/// changes type.
pub fn from_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => decode_integer(inner),
        "doubleValue" => decode_double(inner),
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(from_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(from_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

fn decode_integer(inner: &Value) -> Value {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .unwrap_or_else(|_| inner.clone()),
        Value::Number(_) => inner.clone(),
        _ => Value::Null,
    }
}

// Non-finite doubles arrive as strings ("NaN", "Infinity") and have no JSON number form.
fn decode_double(inner: &Value) -> Value {
    match inner {
        Value::Number(n) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Value::String(_) => inner.clone(),
        _ => Value::Null,
    }
}
